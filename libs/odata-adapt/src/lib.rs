#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Restricted OData query strings (`$select`, `$top`, `$skip`, `$orderby`)
//! parsed into a [`ParsedQuery`] and applied to any [`Queryable`] under a
//! field-visibility policy.
//!
//! ```
//! use odata_adapt::{parse_url, HiddenFields, MemoryQuery, QueryApplier};
//! use serde_json::json;
//!
//! let rows = MemoryQuery::from_json(json!([
//!     {"id": 1, "title": "Build a website", "authorId": 7},
//!     {"id": 2, "title": "The ultimate web bundler", "authorId": 9},
//! ]))?;
//!
//! let policy = HiddenFields::new().hide("book", ["authorId"]);
//! let query = parse_url("https://example.com/books?$select=title&$orderby=title%20desc")?;
//! let rows = QueryApplier::new(&policy, "book")
//!     .apply(query, rows)?
//!     .rows_visible(&policy, "book");
//!
//! assert_eq!(rows, vec![
//!     json!({"title": "The ultimate web bundler"}),
//!     json!({"title": "Build a website"}),
//! ]);
//! # Ok::<(), odata_adapt::Error>(())
//! ```

pub mod applier;
pub mod error;
pub mod limits;
pub mod memory;
pub mod parser;
pub mod problem;
pub mod problem_mapping;
pub mod query;
pub mod queryable;
pub mod visibility;

pub use applier::{QueryApplier, apply};
pub use error::{Error, ParseError, Result, ValidationError};
pub use limits::QueryLimits;
pub use memory::MemoryQuery;
pub use parser::{QueryStringParser, parse_query_string, parse_url};
pub use problem::Problem;
pub use query::{ODataOrderBy, OrderKey, ParsedQuery, SortDir};
pub use queryable::Queryable;
pub use visibility::{HiddenFields, NoHiddenFields, VisibilityPolicy};
