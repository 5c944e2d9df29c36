//! Mapping from query errors to Problem (pure data)
//!
//! Parse errors are the client's malformed input (400); validation errors
//! are well-formed requests for something that is not allowed (422).

use http::StatusCode;

use crate::problem::Problem;
use crate::{Error, ParseError, ValidationError};

/// Machine-readable codes carried in `Problem::code`.
pub mod codes {
    pub const INVALID_URL: &str = "odata.invalid_url";
    pub const INVALID_INTEGER: &str = "odata.invalid_integer";
    pub const INVALID_SELECT: &str = "odata.invalid_select";
    pub const INVALID_ORDERBY: &str = "odata.invalid_orderby";
    pub const LIMIT_EXCEEDED: &str = "odata.limit_exceeded";
    pub const HIDDEN_FIELD: &str = "odata.hidden_field";
    pub const UNKNOWN_FIELD: &str = "odata.unknown_field";
    pub const INTERNAL: &str = "odata.internal";
}

impl From<ParseError> for Problem {
    fn from(err: ParseError) -> Self {
        let detail = err.to_string();
        let (title, code) = match err {
            ParseError::InvalidUrl(_) => ("Invalid URL", codes::INVALID_URL),
            ParseError::InvalidInteger { .. } => ("Invalid Integer", codes::INVALID_INTEGER),
            ParseError::EmptySelectField => ("Invalid Select", codes::INVALID_SELECT),
            ParseError::EmptyOrderByField
            | ParseError::InvalidDirection { .. }
            | ParseError::MalformedOrderBy(_) => ("Invalid OrderBy", codes::INVALID_ORDERBY),
            ParseError::LimitExceeded { .. } => ("Limit Exceeded", codes::LIMIT_EXCEEDED),
        };
        Problem::new(StatusCode::BAD_REQUEST, title, detail).with_code(code)
    }
}

impl From<ValidationError> for Problem {
    fn from(err: ValidationError) -> Self {
        let detail = err.to_string();
        match err {
            ValidationError::HiddenFieldSelected { fields, .. } => {
                Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Hidden Field", detail)
                    .with_code(codes::HIDDEN_FIELD)
                    .with_fields(fields)
            }
            ValidationError::UnknownField { field, .. } => {
                Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Unknown Field", detail)
                    .with_code(codes::UNKNOWN_FIELD)
                    .with_fields(vec![field])
            }
        }
    }
}

impl From<Error> for Problem {
    fn from(err: Error) -> Self {
        match err {
            Error::Parse(e) => e.into(),
            Error::Validation(e) => e.into(),
            // Backend details stay in the logs
            Error::Backend(msg) => {
                tracing::error!(error = %msg, "query backend error");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "An internal error occurred while applying the query",
                )
                .with_code(codes::INTERNAL)
            }
        }
    }
}
