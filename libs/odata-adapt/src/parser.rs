//! Query-string parser for the `$select`, `$top`, `$skip` and `$orderby` keys.
//!
//! Parsing is a pure function of the input: keys and values are decoded with
//! `application/x-www-form-urlencoded` rules, unrecognized keys are ignored,
//! and a recognized key with a malformed value fails the whole parse.

use url::{Url, form_urlencoded};

use crate::{ODataOrderBy, OrderKey, ParseError, ParsedQuery, QueryLimits, SortDir};

pub const SELECT_KEY: &str = "$select";
pub const TOP_KEY: &str = "$top";
pub const SKIP_KEY: &str = "$skip";
pub const ORDERBY_KEY: &str = "$orderby";

// Relative URLs ("/books?$top=1", "?$top=1") are resolved against this base.
const RELATIVE_BASE: &str = "http://localhost/";

/// Raw values of the recognized keys, last occurrence wins.
#[derive(Debug, Default)]
struct RawParams {
    select: Option<String>,
    top: Option<String>,
    skip: Option<String>,
    orderby: Option<String>,
}

impl RawParams {
    fn collect(query: &str) -> Self {
        let mut raw = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                SELECT_KEY => &mut raw.select,
                TOP_KEY => &mut raw.top,
                SKIP_KEY => &mut raw.skip,
                ORDERBY_KEY => &mut raw.orderby,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        raw
    }
}

/// Parses request URLs into [`ParsedQuery`] values under a set of [`QueryLimits`].
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct QueryStringParser {
    limits: QueryLimits,
}

impl QueryStringParser {
    pub fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Parse the query component of an absolute or relative URL.
    ///
    /// The path and fragment are ignored; a URL without a query component
    /// yields an empty [`ParsedQuery`].
    ///
    /// # Errors
    /// Returns `ParseError::InvalidUrl` if the input is not a URL, or any other
    /// `ParseError` produced by [`Self::parse_query_string`].
    pub fn parse_url(&self, raw_url: &str) -> Result<ParsedQuery, ParseError> {
        let base = Url::parse(RELATIVE_BASE).map_err(|e| ParseError::InvalidUrl(e.to_string()))?;
        let url = Url::options()
            .base_url(Some(&base))
            .parse(raw_url)
            .map_err(|e| ParseError::InvalidUrl(format!("{raw_url:?}: {e}")))?;

        self.parse_query_string(url.query().unwrap_or_default())
    }

    /// Parse a raw query component (`a=1&b=2`, an optional leading `?` is accepted).
    ///
    /// # Errors
    /// - `ParseError::InvalidInteger` for a `$top`/`$skip` value that is not `^[0-9]+$`
    /// - `ParseError::EmptySelectField` for an empty `$select` entry
    /// - `ParseError::EmptyOrderByField`, `ParseError::InvalidDirection` or
    ///   `ParseError::MalformedOrderBy` for a bad `$orderby` clause
    /// - `ParseError::LimitExceeded` when a configured limit is exceeded
    pub fn parse_query_string(&self, query: &str) -> Result<ParsedQuery, ParseError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.limits.validate_query_len(query.len())?;

        let raw = RawParams::collect(query);
        let mut parsed = ParsedQuery::new();

        if let Some(value) = raw.select.as_deref() {
            let fields = parse_select(value)?;
            self.limits.validate_select_count(fields.len())?;
            parsed.select = Some(fields);
        }

        if let Some(value) = raw.top.as_deref() {
            let top = parse_unsigned(TOP_KEY, value)?;
            self.limits.validate_top(top)?;
            parsed.top = Some(top);
        }

        if let Some(value) = raw.skip.as_deref() {
            parsed.skip = Some(parse_unsigned(SKIP_KEY, value)?);
        }

        if let Some(value) = raw.orderby.as_deref() {
            let order = parse_orderby(value)?;
            self.limits.validate_orderby_count(order.len())?;
            parsed.order_by = Some(order);
        }

        tracing::debug!(
            select = ?parsed.select,
            top = ?parsed.top,
            skip = ?parsed.skip,
            orderby = %parsed.order_by.as_ref().map(ToString::to_string).unwrap_or_default(),
            "parsed OData query string"
        );

        Ok(parsed)
    }
}

/// Parse the query component of a URL with unbounded limits.
///
/// # Errors
/// See [`QueryStringParser::parse_url`].
pub fn parse_url(raw_url: &str) -> Result<ParsedQuery, ParseError> {
    QueryStringParser::default().parse_url(raw_url)
}

/// Parse a raw query component with unbounded limits.
///
/// # Errors
/// See [`QueryStringParser::parse_query_string`].
pub fn parse_query_string(query: &str) -> Result<ParsedQuery, ParseError> {
    QueryStringParser::default().parse_query_string(query)
}

/// Parse a decoded `$select` value into an ordered field list.
/// Format: "field1, field2, field3"
/// Whitespace around each field is trimmed; names keep their case.
///
/// # Errors
/// Returns `ParseError::EmptySelectField` if any entry is empty (`""`, `"a,"`, `"a,,b"`).
pub fn parse_select(raw: &str) -> Result<Vec<String>, ParseError> {
    raw.split(',')
        .map(str::trim)
        .map(|field| {
            if field.is_empty() {
                Err(ParseError::EmptySelectField)
            } else {
                Ok(field.to_owned())
            }
        })
        .collect()
}

/// Parse a decoded `$top`/`$skip` value. Only plain base-10 digits are accepted,
/// so signs, fractions and surrounding whitespace are rejected.
///
/// # Errors
/// Returns `ParseError::InvalidInteger` if the value is not `^[0-9]+$` or overflows `u64`.
pub fn parse_unsigned(key: &'static str, raw: &str) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidInteger {
        key,
        value: raw.to_owned(),
    };

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<u64>().map_err(|_| invalid())
}

/// Parse a decoded `$orderby` value into ordering keys.
/// Format: "field1 [asc|desc], field2 [asc|desc], ..."
/// Direction is case-insensitive and defaults to asc.
///
/// # Errors
/// - `ParseError::EmptyOrderByField` if a clause has no field name
/// - `ParseError::InvalidDirection` if the direction is not asc/desc
/// - `ParseError::MalformedOrderBy` if a clause has more than two tokens
pub fn parse_orderby(raw: &str) -> Result<ODataOrderBy, ParseError> {
    let mut keys = Vec::new();

    for part in raw.split(',') {
        let part = part.trim();
        let tokens: Vec<&str> = part.split_whitespace().collect();

        let key = match tokens.as_slice() {
            [] => return Err(ParseError::EmptyOrderByField),
            [field] => OrderKey::asc(*field),
            [field, token] => {
                let dir = SortDir::from_token(token).ok_or_else(|| ParseError::InvalidDirection {
                    field: (*field).to_owned(),
                    direction: (*token).to_owned(),
                })?;
                OrderKey::new(*field, dir)
            }
            _ => return Err(ParseError::MalformedOrderBy(part.to_owned())),
        };

        keys.push(key);
    }

    Ok(ODataOrderBy(keys))
}
