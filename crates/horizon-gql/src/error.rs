//! Error types for query construction, serialization, and response access.

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, serializing, or reading GraphQL documents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The builder was misused (no open scope, invalid name, empty selection).
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// A fragment spread names a fragment that was never supplied.
    #[error("Fragment '{name}' is spread but was never defined")]
    DanglingFragmentReference { name: String },

    /// Two different fragment bodies were registered under the same name.
    #[error("Fragment '{name}' is defined more than once with different selections")]
    DuplicateFragmentName { name: String },

    /// A fragment reaches itself through its own spreads.
    #[error("Fragment '{name}' spreads itself (cycle: {cycle})")]
    CyclicFragment { name: String, cycle: String },

    /// An argument value has no GraphQL literal form.
    #[error("Invalid value for argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// A response field was read that the response does not contain.
    #[error("Field '{field}' not found at '{path}'")]
    MissingField { field: String, path: String },

    /// A response list was indexed past its end.
    #[error("Index {index} out of bounds at '{path}' (length {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        path: String,
    },
}

impl Error {
    /// Create a malformed query error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQuery(message.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            path: path.into(),
        }
    }
}
