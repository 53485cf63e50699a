//! Request/response seam between the form controller and the network.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method};
use shared::protocol::JSON_CONTENT_TYPE;
use url::Url;

use crate::error::{ClientError, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn post_json(url: Url, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url,
            content_type: JSON_CONTENT_TYPE.to_string(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and hands back whatever the server answered.
///
/// Non-2xx statuses come back as `Ok`; only failures to get any answer at
/// all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .build()
            .map_err(ClientError::HttpClient)?;
        Ok(Self { http, timeout })
    }

    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            timeout: None,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.to_string();
        let mut builder = self
            .http
            .request(request.method, request.url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(&url, err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::from_reqwest(&url, err))?;
        tracing::debug!(%url, status, bytes = body.len(), "received calculation response");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
