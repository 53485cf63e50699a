//! Controller layer: alert classification for the calculator form.

pub mod events;
