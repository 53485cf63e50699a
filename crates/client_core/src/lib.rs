//! Client side of the calculator: the form controller and the transport it
//! posts expressions through.

pub mod config;
pub mod controller;
pub mod error;
pub mod transport;

pub use config::{load_settings, load_settings_from, ClientSettings};
pub use controller::{
    AlertKind, AttachedForm, CalculationOutcome, CalculatorForm, Completion, FormController,
    RequestId, SubmitEvent,
};
pub use error::{ClientError, TransportError};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
