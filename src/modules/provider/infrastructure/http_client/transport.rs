//! Transport seam between the engine and the network.
//!
//! Everything above this layer only sees a status code and a body string,
//! so tests can script provider behaviour without a server.

use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Raw HTTP answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET that gives up after `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError>;
}

/// Header set sent with every provider request
#[derive(Debug, Clone)]
pub struct RequestHeaders {
    pub user_agent: String,
    pub referer: Option<String>,
    pub origin: Option<String>,
}

/// Production transport over `reqwest`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(headers: &RequestHeaders) -> AppResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        if let Some(referer) = &headers.referer {
            default_headers.insert(REFERER, Self::header_value(referer)?);
        }
        if let Some(origin) = &headers.origin {
            default_headers.insert(ORIGIN, Self::header_value(origin)?);
        }

        let client = Client::builder()
            .user_agent(&headers.user_agent)
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    fn header_value(value: &str) -> AppResult<HeaderValue> {
        HeaderValue::from_str(value)
            .map_err(|e| AppError::ConfigError(format!("Invalid header value '{}': {}", value, e)))
    }

    fn map_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::map_error)?;
        Ok(TransportResponse { status, body })
    }
}
