//! Request client for LLM endpoints
//!
//! [`RequestClient`] sends a raw text payload to one endpoint with a single
//! POST and hands back the response body. The HTTP work sits behind the
//! [`Transport`] trait; [`HttpTransport`] is the reqwest implementation.
//!
//! Outcomes are kept apart:
//! - `Ok(body)` - the endpoint answered with a 2xx status (body may be empty)
//! - `Err(RequestError::InsecureEndpoint)` - rejected before any I/O
//! - `Err(RequestError::Transport)` - the request never completed
//! - `Err(RequestError::Status)` - the endpoint answered with a non-2xx status
//!
//! Every error is also appended to the error log.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RequestConfig;
use crate::exchange_log::ErrorLog;

/// Raw response from a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP status level
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to initialize HTTP client: {0}")]
    Init(String),
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Request(String),
}

/// Errors returned by [`RequestClient::send_request`]
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("refusing endpoint without https scheme: {0:?}")]
    InsecureEndpoint(String),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
}

/// Something that can POST a body to a URL
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the HTTP client. Without a timeout, reqwest's default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("llm-connector/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Init(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.to_string())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(TransportResponse { status, body })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

/// Sends payloads to endpoints and records failures
pub struct RequestClient<T> {
    transport: T,
    content_type: String,
    require_https: bool,
    errors: ErrorLog,
}

impl<T: Transport> RequestClient<T> {
    pub fn new(transport: T, config: &RequestConfig, errors: ErrorLog) -> Self {
        Self {
            transport,
            content_type: config.content_type.clone(),
            require_https: config.require_https,
            errors,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST `text` to `endpoint` and return the response body
    pub async fn send_request(&self, endpoint: &str, text: &str) -> Result<String, RequestError> {
        let result = self.dispatch(endpoint, text).await;
        if let Err(ref e) = result {
            warn!("{}", e);
            self.errors.record(e.to_string());
        }
        result
    }

    /// Send `text` to `from`, then forward its response to `to`.
    /// Returns the response from `to`.
    pub async fn send_output(&self, from: &str, to: &str, text: &str) -> Result<String, RequestError> {
        let output = self.send_request(from, text).await?;
        self.send_request(to, &output).await
    }

    async fn dispatch(&self, endpoint: &str, text: &str) -> Result<String, RequestError> {
        if self.require_https && !endpoint.starts_with("https") {
            return Err(RequestError::InsecureEndpoint(endpoint.to_string()));
        }

        debug!("POST {} ({} bytes)", endpoint, text.len());
        let response = self
            .transport
            .post(endpoint, &self.content_type, text)
            .await
            .map_err(|source| RequestError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if !response.is_success() {
            return Err(RequestError::Status {
                endpoint: endpoint.to_string(),
                status: response.status,
                body: response.body,
            });
        }

        debug!("{} answered with {} bytes", endpoint, response.body.len());
        Ok(response.body)
    }
}

/// Transport double that replays canned responses and records every call
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        pub url: String,
        pub content_type: String,
        pub body: String,
    }

    #[derive(Default)]
    pub struct FakeTransport {
        responses: HashMap<String, Result<TransportResponse, TransportError>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer `url` with a 200 and `body`
        pub fn respond(mut self, url: &str, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), Ok(TransportResponse::ok(body)));
            self
        }

        pub fn respond_with(mut self, url: &str, response: TransportResponse) -> Self {
            self.responses.insert(url.to_string(), Ok(response));
            self
        }

        pub fn fail(mut self, url: &str, error: TransportError) -> Self {
            self.responses.insert(url.to_string(), Err(error));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn urls(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.url).collect()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn post(
            &self,
            url: &str,
            content_type: &str,
            body: &str,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                content_type: content_type.to_string(),
                body: body.to_string(),
            });
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(TransportResponse::ok("")))
        }
    }
}
