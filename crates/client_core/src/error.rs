use std::path::PathBuf;

use shared::error::WireError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl TransportError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connect {
                url,
                message: err.to_string(),
            }
        } else {
            Self::Request {
                url,
                message: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("invalid page url '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("cannot resolve endpoint '{endpoint}' against '{page_url}': {source}")]
    InvalidEndpoint {
        page_url: String,
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to read settings file '{}': {source}", path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
