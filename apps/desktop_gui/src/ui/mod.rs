//! UI layer for the desktop calculator: form state and the eframe app shell.

pub mod app;

pub use app::{CalculatorApp, FormState};
