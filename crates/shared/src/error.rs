use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the calculation service returns with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub msg: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorDetail {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: None,
        }
    }
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            detail: vec![ErrorDetail::new(msg)],
        }
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(body).map_err(WireError::MalformedError)
    }

    /// Only the first entry is ever surfaced to the user.
    pub fn first_message(&self) -> Option<&str> {
        self.detail.first().map(|detail| detail.msg.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed calculation response: {0}")]
    MalformedResult(#[source] serde_json::Error),
    #[error("malformed error response: {0}")]
    MalformedError(#[source] serde_json::Error),
    #[error("error response carries no detail entries")]
    EmptyDetail,
    #[error("failed to encode calculation request: {0}")]
    Encode(#[source] serde_json::Error),
}
