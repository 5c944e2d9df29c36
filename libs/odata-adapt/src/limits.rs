//! Input safety limits for query-string parsing
//!
//! Every cap is optional and unset by default, so the plain grammar accepts
//! any well-formed value. Deployments that face untrusted traffic can cap:
//! - the raw query-string length
//! - the `$top` value
//! - the number of `$select` fields
//! - the number of `$orderby` clauses

use serde::{Deserialize, Serialize};

use crate::ParseError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[must_use]
pub struct QueryLimits {
    /// Maximum length of the raw query component in bytes
    pub max_query_len: Option<usize>,
    /// Maximum value for $top
    pub max_top: Option<u64>,
    /// Maximum number of fields in $select
    pub max_select_fields: Option<usize>,
    /// Maximum number of clauses in $orderby
    pub max_orderby_fields: Option<usize>,
}

impl QueryLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_query_len(mut self, max: usize) -> Self {
        self.max_query_len = Some(max);
        self
    }

    pub fn with_max_top(mut self, max: u64) -> Self {
        self.max_top = Some(max);
        self
    }

    pub fn with_max_select_fields(mut self, max: usize) -> Self {
        self.max_select_fields = Some(max);
        self
    }

    pub fn with_max_orderby_fields(mut self, max: usize) -> Self {
        self.max_orderby_fields = Some(max);
        self
    }

    /// Validate the raw query length.
    ///
    /// # Errors
    /// Returns `ParseError::LimitExceeded` if the query is longer than `max_query_len`.
    pub fn validate_query_len(&self, len: usize) -> Result<(), ParseError> {
        check("query string length", len, self.max_query_len)
    }

    /// Validate a `$top` value.
    ///
    /// # Errors
    /// Returns `ParseError::LimitExceeded` if `top` is above `max_top`.
    pub fn validate_top(&self, top: u64) -> Result<(), ParseError> {
        match self.max_top {
            Some(max) if top > max => Err(ParseError::LimitExceeded { what: "$top", max }),
            _ => Ok(()),
        }
    }

    /// Validate the number of `$select` fields.
    ///
    /// # Errors
    /// Returns `ParseError::LimitExceeded` if there are more than `max_select_fields`.
    pub fn validate_select_count(&self, count: usize) -> Result<(), ParseError> {
        check("$select field count", count, self.max_select_fields)
    }

    /// Validate the number of `$orderby` clauses.
    ///
    /// # Errors
    /// Returns `ParseError::LimitExceeded` if there are more than `max_orderby_fields`.
    pub fn validate_orderby_count(&self, count: usize) -> Result<(), ParseError> {
        check("$orderby field count", count, self.max_orderby_fields)
    }
}

fn check(what: &'static str, actual: usize, max: Option<usize>) -> Result<(), ParseError> {
    match max {
        Some(max) if actual > max => Err(ParseError::LimitExceeded {
            what,
            max: max as u64,
        }),
        _ => Ok(()),
    }
}
