//! Error types for executing operations.

use crate::response::GraphQLExecutionError;

/// Failures of the HTTP layer: the request did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Request timed out.
    #[error("Request timed out")]
    Timeout,
    /// Connection refused or failed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// HTTP error status (anything outside 2xx).
    #[error("HTTP {status}{}", .body.as_deref().map(|b| format!(": {b}")).unwrap_or_default())]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, if it could be read.
        body: Option<String>,
    },
    /// The request could not be built or sent.
    #[error("HTTP request error: {0}")]
    Request(String),
    /// The async runtime driving the client could not be started.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: None,
            }
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Errors returned by [`GraphQLClient`](crate::GraphQLClient).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The operation could not be serialized.
    #[error("Query error: {0}")]
    Query(#[from] horizon_gql::Error),

    /// The HTTP exchange failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The server reported errors and returned no data.
    #[error(transparent)]
    Execution(#[from] GraphQLExecutionError),

    /// The response had neither `data` nor `errors`.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for ClientError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for ClientError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let with_body = TransportError::Status {
            status: 502,
            body: Some("bad gateway".into()),
        };
        assert_eq!(with_body.to_string(), "HTTP 502: bad gateway");

        let without_body = TransportError::Status {
            status: 404,
            body: None,
        };
        assert_eq!(without_body.to_string(), "HTTP 404");
    }

    #[test]
    fn test_query_error_conversion() {
        let err: ClientError = horizon_gql::Error::DanglingFragmentReference {
            name: "CatFields".into(),
        }
        .into();
        assert!(matches!(err, ClientError::Query(_)));
        assert!(err.to_string().contains("CatFields"));
    }
}
