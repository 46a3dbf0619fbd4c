//! GraphQL response envelope and execution results.

use std::fmt;

use horizon_gql::ResponseValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL error returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the document where the error occurred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphQLLocation>,

    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Additional error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref path) = self.path {
            write!(f, " (at ")?;
            for (i, segment) in path.iter().enumerate() {
                match segment {
                    PathSegment::Field(name) => {
                        if i > 0 {
                            write!(f, ".")?;
                        }
                        write!(f, "{}", name)?;
                    }
                    PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// A location in a GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// A segment in an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// An array index.
    Index(usize),
}

/// Errors reported by the server in the response `errors` array.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLExecutionError {
    errors: Vec<GraphQLError>,
}

impl GraphQLExecutionError {
    /// Wrap a non-empty error list.
    pub fn new(errors: Vec<GraphQLError>) -> Self {
        Self { errors }
    }

    /// All errors, in server order.
    pub fn errors(&self) -> &[GraphQLError] {
        &self.errors
    }

    /// The error messages, in server order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.message.as_str())
    }

    /// All error messages joined with `; `.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for GraphQLExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphQL error: {}", self.message())
    }
}

impl std::error::Error for GraphQLExecutionError {}

/// The decoded response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub errors: Option<Vec<GraphQLError>>,

    #[serde(default)]
    pub extensions: Option<Value>,
}

/// The outcome of one `execute` call: the document that was sent and the
/// wrapped `data` it produced.
///
/// When the server returned both `data` and `errors`, the data is kept and the
/// errors are available through [`errors`](Self::errors).
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    query: String,
    data: ResponseValue,
    errors: Option<GraphQLExecutionError>,
    extensions: Option<ResponseValue>,
}

impl ExecutionResult {
    pub(crate) fn new(
        query: String,
        data: ResponseValue,
        errors: Option<GraphQLExecutionError>,
        extensions: Option<ResponseValue>,
    ) -> Self {
        Self {
            query,
            data,
            errors,
            extensions,
        }
    }

    /// The serialized document that was sent.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The wrapped `data` value.
    pub fn data(&self) -> &ResponseValue {
        &self.data
    }

    /// Errors the server reported alongside the data, if any.
    pub fn errors(&self) -> Option<&GraphQLExecutionError> {
        self.errors.as_ref()
    }

    /// Check if the server reported any errors.
    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    /// The response `extensions`, if any.
    pub fn extensions(&self) -> Option<&ResponseValue> {
        self.extensions.as_ref()
    }

    /// Read a dotted path from the data, e.g. `catCollection.items.0.name`.
    pub fn path(&self, path: &str) -> horizon_gql::Result<&ResponseValue> {
        self.data.path(path)
    }

    /// Fail if the server reported errors, discarding the partial data.
    pub fn into_result(self) -> Result<Self, GraphQLExecutionError> {
        match self.errors {
            Some(errors) => Err(errors),
            None => Ok(self),
        }
    }

    /// Consume the result, returning the data.
    pub fn into_data(self) -> ResponseValue {
        self.data
    }
}
