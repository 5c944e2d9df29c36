//! Error types for query-string parsing and query application.
//!
//! Both kinds are terminal: a malformed or forbidden request must be changed by
//! the caller, nothing here is retried or silently defaulted.

/// A recognized query-string key carried a value that does not match its grammar.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid {key} value: {value:?} is not a non-negative integer")]
    InvalidInteger { key: &'static str, value: String },

    #[error("invalid $orderby direction {direction:?} for field {field:?}; expected asc or desc")]
    InvalidDirection { field: String, direction: String },

    #[error("$select contains an empty field name")]
    EmptySelectField,

    #[error("$orderby contains a clause without a field name")]
    EmptyOrderByField,

    #[error("malformed $orderby clause: {0:?}")]
    MalformedOrderBy(String),

    #[error("{what} exceeds the configured maximum of {max}")]
    LimitExceeded { what: &'static str, max: u64 },
}

/// The parsed query is well formed but may not be applied to the target.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "one of the fields in the $select query string value is hidden for record type {record_type:?}: {}",
        .fields.join(", ")
    )]
    HiddenFieldSelected {
        record_type: String,
        fields: Vec<String>,
    },

    #[error("unknown field {field:?} in {context}")]
    UnknownField {
        context: &'static str,
        field: String,
    },
}

/// Unified error for the parse → validate → apply pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    // Raised by a Queryable backend that could not accept a modification
    #[error("query backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Errors from this crate describe the request itself, so retrying the
    /// same request can never succeed.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn is_retryable(&self) -> bool {
        false
    }

    #[must_use]
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
