//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It encodes JSON and
//! form bodies, appends query parameters and decodes every response body
//! into a JSON value, whatever the status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::debug;
use trapi_application::ports::{
    HttpMethod, HttpTransport, TransportBody, TransportError, TransportRequest, TransportResponse,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("trapi/", env!("CARGO_PKG_VERSION"));

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP transport backed by `reqwest::Client`.
///
/// The client is reused across requests, so keep one transport per
/// process and share it through `Arc`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport with [`DEFAULT_USER_AGENT`] and [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other {
                message: e.to_string(),
            })?;
        Ok(Self { client, timeout })
    }

    /// Wraps an existing reqwest client. `timeout` is only used to report
    /// timeouts and should match the one the client was built with.
    #[must_use]
    pub const fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    fn build_url(url: &str, query: &[(String, String)]) -> Result<Url, TransportError> {
        let mut parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            message: format!("{e}: {url}"),
        })?;
        if !query.is_empty() {
            parsed
                .query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(parsed)
    }

    fn build_body(
        builder: RequestBuilder,
        body: &TransportBody,
        has_content_type: bool,
    ) -> Result<RequestBuilder, TransportError> {
        match body {
            TransportBody::Empty => Ok(builder),
            TransportBody::Json(value) => Ok(builder.json(value)),
            TransportBody::Form(pairs) => {
                let encoded =
                    serde_urlencoded::to_string(pairs).map_err(|e| TransportError::Other {
                        message: format!("failed to encode form: {e}"),
                    })?;
                let builder = if has_content_type {
                    builder
                } else {
                    builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                };
                Ok(builder.body(encoded))
            }
        }
    }

    /// Turns a response body into JSON. Empty bodies become `null` and
    /// anything that is not JSON is kept as a string.
    fn decode_body(bytes: &[u8]) -> Value {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }

    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return TransportError::Connection {
                message: error.to_string(),
            };
        }
        if error.is_builder() {
            return TransportError::InvalidUrl {
                message: error.to_string(),
            };
        }
        if error.is_decode() || error.is_body() {
            return TransportError::Decode {
                message: error.to_string(),
            };
        }
        TransportError::Other {
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = Self::build_url(&request.url, &request.query)?;
        let has_content_type = request.header("content-type").is_some();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = Self::build_body(builder, &request.body, has_content_type)?;

        let response = builder.send().await.map_err(|e| self.map_error(&e))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.map_error(&e))?;
        debug!(status, bytes = bytes.len(), "response body read");

        Ok(TransportResponse::new(status, Self::decode_body(&bytes)))
    }
}
