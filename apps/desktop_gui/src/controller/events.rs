//! Alert modeling for the calculator window.

use client_core::AlertKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// The service understood the request and refused it.
    Rejected,
    Transport,
    Unknown,
}

impl From<AlertKind> for UiErrorCategory {
    fn from(kind: AlertKind) -> Self {
        match kind {
            AlertKind::Rejected => UiErrorCategory::Rejected,
            AlertKind::Unreachable => UiErrorCategory::Transport,
            AlertKind::Unexpected => UiErrorCategory::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    message: String,
}

impl UiError {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            category: kind.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self.category {
            UiErrorCategory::Rejected => None,
            UiErrorCategory::Transport => {
                Some("Calculation service unreachable; check the page URL and network.")
            }
            UiErrorCategory::Unknown => Some("The service returned an unexpected error."),
        }
    }
}
