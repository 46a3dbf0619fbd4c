//! GraphQL client implementation.

use std::sync::Arc;
use std::time::Duration;

use horizon_gql::{Fragment, FragmentMode, Operation, ResponseValue, Serializer};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::{ClientError, Result, TransportError};
use crate::response::{Envelope, ExecutionResult, GraphQLExecutionError};
use crate::transport::{HttpTransport, HttpTransportConfig, Transport, TransportRequest};

const GITHUB_URL: &str = "https://api.github.com/graphql";
const CONTENTFUL_URL: &str = "https://graphql.contentful.com/content/v1/spaces";

/// Builder for creating a GraphQL client.
pub struct GraphQLClientBuilder {
    url: String,
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
    transport_config: HttpTransportConfig,
    serializer: Serializer,
}

impl GraphQLClientBuilder {
    /// Create a new builder with the specified GraphQL endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            transport: None,
            transport_config: HttpTransportConfig::default(),
            serializer: Serializer::new(),
        }
    }

    /// Add a default header to all requests.
    ///
    /// A later header with the same name replaces an earlier one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add multiple headers.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set bearer token authentication.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(AUTHORIZATION.as_str(), value)
    }

    /// Set the request timeout of the default HTTP transport.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.transport_config.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout of the default HTTP transport.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport_config.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent of the default HTTP transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport_config.user_agent = Some(user_agent.into());
        self
    }

    /// Route the default HTTP transport through a proxy.
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.transport_config.proxy = Some(url.into());
        self
    }

    /// Use a custom transport instead of the HTTP one.
    ///
    /// Timeouts, user agent and proxy settings are ignored when a custom
    /// transport is installed.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Render fragments as named definitions or inline them.
    pub fn fragment_mode(mut self, mode: FragmentMode) -> Self {
        self.serializer = self.serializer.fragment_mode(mode);
        self
    }

    /// Make a fragment available to resolve name-only spreads.
    pub fn fragment(mut self, fragment: Fragment) -> Self {
        self.serializer = self.serializer.fragment(fragment);
        self
    }

    /// Build the GraphQL client.
    pub fn build(self) -> Result<GraphQLClient> {
        let url = url::Url::parse(&self.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_str(value)?;
            headers.insert(name, value);
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_config(self.transport_config)?),
        };

        Ok(GraphQLClient {
            inner: Arc::new(GraphQLClientInner {
                url: self.url,
                headers,
                transport,
                serializer: self.serializer,
            }),
        })
    }
}

struct GraphQLClientInner {
    url: String,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    serializer: Serializer,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
}

/// A blocking GraphQL client for queries and mutations.
///
/// Each [`execute`](Self::execute) serializes the operation, sends exactly one
/// request and wraps the returned `data`. Cloning is cheap; clones share the
/// transport.
///
/// # Example
///
/// ```no_run
/// use horizon_gql::Operation;
/// use horizon_gql_net::GraphQLClient;
///
/// let client = GraphQLClient::contentful("space", "token", "master").build()?;
///
/// let query = Operation::query(|q| {
///     q.field("catCollection").arg("limit", 1).select(|c| {
///         c.field("items").select(|i| {
///             i.field("name");
///             i.field("likes");
///         });
///     });
/// })?;
///
/// let result = client.execute(&query)?;
/// let name = result.path("catCollection.items.0.name")?;
/// println!("{:?}", name.as_str());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    inner: Arc<GraphQLClientInner>,
}

impl GraphQLClient {
    /// Create a new GraphQL client with the specified endpoint URL.
    pub fn new(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// Create a new builder for configuring a GraphQL client.
    pub fn builder(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// A builder for the GitHub GraphQL API.
    pub fn github(token: impl AsRef<str>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(GITHUB_URL).bearer_auth(token)
    }

    /// A builder for the Contentful GraphQL Content API.
    pub fn contentful(
        space: impl AsRef<str>,
        token: impl AsRef<str>,
        environment: impl AsRef<str>,
    ) -> GraphQLClientBuilder {
        let url = format!(
            "{CONTENTFUL_URL}/{}/environments/{}",
            space.as_ref(),
            environment.as_ref()
        );
        GraphQLClientBuilder::new(url).bearer_auth(token)
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Get the headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Execute an operation using the client's serializer settings.
    pub fn execute(&self, operation: &Operation) -> Result<ExecutionResult> {
        self.execute_with(operation, &self.inner.serializer)
    }

    /// Execute an operation using explicit serializer settings.
    ///
    /// Blocks the calling thread. Do not call from inside an async task; use
    /// `tokio::task::spawn_blocking` there.
    pub fn execute_with(
        &self,
        operation: &Operation,
        serializer: &Serializer,
    ) -> Result<ExecutionResult> {
        let query = serializer.serialize(operation)?;
        let body = serde_json::to_string(&RequestBody { query: &query })
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let request = TransportRequest {
            url: self.inner.url.clone(),
            body,
            headers: self.inner.headers.clone(),
        };

        tracing::debug!(
            target: "horizon_gql_net::client",
            url = %request.url,
            operation = %operation.operation_type(),
            "Executing operation"
        );

        let response = self.inner.transport.send(&request)?;
        if !response.is_success() {
            let text = response.text();
            return Err(TransportError::Status {
                status: response.status,
                body: (!text.is_empty()).then_some(text),
            }
            .into());
        }

        let envelope: Envelope = serde_json::from_slice(&response.body)?;
        Self::interpret(query, envelope)
    }

    fn interpret(query: String, envelope: Envelope) -> Result<ExecutionResult> {
        let errors = envelope
            .errors
            .filter(|errors| !errors.is_empty())
            .map(GraphQLExecutionError::new);
        let extensions = envelope.extensions.map(ResponseValue::from);

        match (envelope.data, errors) {
            (Some(data), errors) => {
                if let Some(ref errors) = errors {
                    tracing::warn!(
                        target: "horizon_gql_net::client",
                        count = errors.errors().len(),
                        "Partial response: {}",
                        errors.message()
                    );
                }
                Ok(ExecutionResult::new(
                    query,
                    ResponseValue::from(data),
                    errors,
                    extensions,
                ))
            }
            (None, Some(errors)) => Err(ClientError::Execution(errors)),
            (None, None) => Err(ClientError::Protocol(
                "response contains neither data nor errors".into(),
            )),
        }
    }
}

impl std::fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("url", &self.inner.url)
            .field("serializer", &self.inner.serializer)
            .finish()
    }
}
