//! Field-visibility policies: which fields of a record type may never be selected.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Read-only source of hidden field names, keyed by record type.
///
/// The core only consults a policy; how a record type declares its hidden
/// fields is up to the implementation.
pub trait VisibilityPolicy {
    /// Hidden field names for `record_type` (may be empty).
    fn hidden_fields(&self, record_type: &str) -> BTreeSet<String>;

    fn is_hidden(&self, record_type: &str, field: &str) -> bool {
        self.hidden_fields(record_type).contains(field)
    }
}

impl<P: VisibilityPolicy + ?Sized> VisibilityPolicy for &P {
    fn hidden_fields(&self, record_type: &str) -> BTreeSet<String> {
        (**self).hidden_fields(record_type)
    }

    fn is_hidden(&self, record_type: &str, field: &str) -> bool {
        (**self).is_hidden(record_type, field)
    }
}

impl<P: VisibilityPolicy + ?Sized> VisibilityPolicy for Arc<P> {
    fn hidden_fields(&self, record_type: &str) -> BTreeSet<String> {
        (**self).hidden_fields(record_type)
    }

    fn is_hidden(&self, record_type: &str, field: &str) -> bool {
        (**self).is_hidden(record_type, field)
    }
}

/// Policy under which every field is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHiddenFields;

impl VisibilityPolicy for NoHiddenFields {
    fn hidden_fields(&self, _record_type: &str) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn is_hidden(&self, _record_type: &str, _field: &str) -> bool {
        false
    }
}

/// Static table of hidden fields per record type.
///
/// Deserializes from a plain map, e.g. YAML:
///
/// ```yaml
/// book: [authorId]
/// user: [password_hash, totp_secret]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct HiddenFields {
    by_record_type: BTreeMap<String, BTreeSet<String>>,
}

impl HiddenFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::insert`].
    pub fn hide<I, S>(mut self, record_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(record_type, fields);
        self
    }

    /// Add hidden fields for a record type, keeping any already registered.
    pub fn insert<I, S>(&mut self, record_type: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_record_type
            .entry(record_type.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.by_record_type.keys().map(String::as_str)
    }
}

impl VisibilityPolicy for HiddenFields {
    fn hidden_fields(&self, record_type: &str) -> BTreeSet<String> {
        self.by_record_type
            .get(record_type)
            .cloned()
            .unwrap_or_default()
    }

    fn is_hidden(&self, record_type: &str, field: &str) -> bool {
        self.by_record_type
            .get(record_type)
            .is_some_and(|fields| fields.contains(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_fields_are_scoped_by_record_type() {
        let policy = HiddenFields::new()
            .hide("book", ["authorId"])
            .hide("user", ["password_hash"]);

        assert!(policy.is_hidden("book", "authorId"));
        assert!(!policy.is_hidden("book", "password_hash"));
        assert!(!policy.is_hidden("author", "authorId"));
        assert!(policy.hidden_fields("unknown").is_empty());
        assert_eq!(policy.record_types().collect::<Vec<_>>(), ["book", "user"]);
    }

    #[test]
    fn insert_merges_fields() {
        let mut policy = HiddenFields::new().hide("book", ["authorId"]);
        policy.insert("book", ["isbn"]);

        let hidden = policy.hidden_fields("book");
        assert_eq!(hidden.len(), 2);
        assert!(hidden.contains("isbn"));
    }

    #[test]
    fn deserializes_from_plain_map() {
        let policy: HiddenFields = serde_json::from_value(serde_json::json!({
            "book": ["authorId"]
        }))
        .unwrap();
        assert!(policy.is_hidden("book", "authorId"));
    }

    #[test]
    fn policies_work_through_references_and_arcs() {
        let policy = Arc::new(HiddenFields::new().hide("book", ["authorId"]));
        let by_ref: &dyn VisibilityPolicy = &policy;
        assert!(by_ref.is_hidden("book", "authorId"));
        assert!(!NoHiddenFields.is_hidden("book", "authorId"));
    }
}
