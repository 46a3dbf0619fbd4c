//! HTTP transport boundary.
//!
//! The client hands a [`TransportRequest`] to a [`Transport`] and gets back a
//! status code and body bytes. [`HttpTransport`] is the default, backed by
//! `reqwest`; tests and embedders can supply their own implementation.

use std::time::Duration;

use bytes::Bytes;

use crate::error::TransportError;
use crate::runtime;

/// A POST request carrying a serialized GraphQL envelope.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The endpoint URL.
    pub url: String,
    /// The JSON request body, `{"query": "..."}`.
    pub body: String,
    /// Request headers.
    pub headers: http::HeaderMap,
}

/// The raw HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and blocks until the response arrives.
///
/// Implementations must not retry; each call is exactly one exchange.
pub trait Transport: Send + Sync {
    /// Send `request`, returning the response whatever its status.
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Configuration for the HTTP transport.
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: Some(format!("HorizonGql/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            proxy: None,
        }
    }
}

/// [`Transport`] over a `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a transport with custom configuration.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| TransportError::Request(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        tracing::debug!(
            target: "horizon_gql_net::transport",
            url = %request.url,
            bytes = request.body.len(),
            "POST"
        );

        let exchange = async {
            let response = self
                .client
                .post(&request.url)
                .headers(request.headers.clone())
                .body(request.body.clone())
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, TransportError>(TransportResponse { status, body })
        };

        let response = runtime::block_on(exchange)??;
        tracing::debug!(
            target: "horizon_gql_net::transport",
            status = response.status,
            bytes = response.body.len(),
            "Response received"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish()
    }
}
