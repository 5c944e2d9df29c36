use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::{HiddenFields, NoHiddenFields, ODataOrderBy, OrderKey, SortDir};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Select(Vec<String>),
    Limit(u64),
    Offset(u64),
    Order(String, SortDir),
}

/// Records every modification into a log shared with the test.
#[derive(Clone, Debug, Default)]
struct Recorder {
    log: Rc<RefCell<Vec<Call>>>,
    known: Option<Vec<&'static str>>,
}

impl Recorder {
    fn with_fields(fields: &[&'static str]) -> Self {
        Self {
            log: Rc::default(),
            known: Some(fields.to_vec()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }
}

impl Queryable for Recorder {
    fn restrict_fields(self, fields: &[String]) -> Result<Self, Error> {
        self.log.borrow_mut().push(Call::Select(fields.to_vec()));
        Ok(self)
    }

    fn limit(self, count: u64) -> Self {
        self.log.borrow_mut().push(Call::Limit(count));
        self
    }

    fn offset(self, count: u64) -> Self {
        self.log.borrow_mut().push(Call::Offset(count));
        self
    }

    fn add_ordering(self, field: &str, dir: SortDir) -> Result<Self, Error> {
        if field == "explode" {
            return Err(Error::Backend("cannot order by explode".to_owned()));
        }
        self.log
            .borrow_mut()
            .push(Call::Order(field.to_owned(), dir));
        Ok(self)
    }

    fn has_field(&self, field: &str) -> bool {
        self.known
            .as_ref()
            .is_none_or(|known| known.iter().any(|k| *k == field))
    }
}

fn book_policy() -> HiddenFields {
    HiddenFields::new().hide("book", ["authorId"])
}

#[test]
fn applies_in_fixed_order() {
    let policy = book_policy();
    let query = ParsedQuery::new()
        .with_order(ODataOrderBy(vec![
            OrderKey::desc("title"),
            OrderKey::asc("id"),
        ]))
        .with_skip(5)
        .with_top(10)
        .with_select(["title", "id"]);

    let target = QueryApplier::new(&policy, "book")
        .apply(query, Recorder::default())
        .unwrap();

    assert_eq!(
        target.calls(),
        vec![
            Call::Select(vec!["title".to_owned(), "id".to_owned()]),
            Call::Limit(10),
            Call::Offset(5),
            Call::Order("title".to_owned(), SortDir::Desc),
            Call::Order("id".to_owned(), SortDir::Asc),
        ]
    );
}

#[test]
fn empty_query_leaves_target_untouched() {
    let target = apply(ParsedQuery::new(), Recorder::default(), &book_policy(), "book").unwrap();
    assert!(target.calls().is_empty());
}

#[test]
fn absent_keys_are_skipped() {
    let target = apply(
        ParsedQuery::new().with_skip(1),
        Recorder::default(),
        &NoHiddenFields,
        "book",
    )
    .unwrap();
    assert_eq!(target.calls(), vec![Call::Offset(1)]);
}

#[test]
fn hidden_field_rejected_before_any_modification() {
    let recorder = Recorder::default();
    let log = Rc::clone(&recorder.log);
    let query = ParsedQuery::new()
        .with_top(1)
        .with_select(["name", "authorId"]);

    let err = apply(query, recorder, &book_policy(), "book").unwrap_err();

    assert_eq!(
        err,
        Error::Validation(ValidationError::HiddenFieldSelected {
            record_type: "book".to_owned(),
            fields: vec!["authorId".to_owned()],
        })
    );
    assert!(err.to_string().contains("$select"));
    assert!(log.borrow().is_empty());
}

#[test]
fn hidden_fields_reported_once_in_request_order() {
    let policy = HiddenFields::new().hide("user", ["secret", "hash"]);
    let query = ParsedQuery::new().with_select(["hash", "id", "secret", "hash"]);

    let err = QueryApplier::new(&policy, "user")
        .validate(&query, &Recorder::default())
        .unwrap_err();

    assert_eq!(
        err,
        ValidationError::HiddenFieldSelected {
            record_type: "user".to_owned(),
            fields: vec!["hash".to_owned(), "secret".to_owned()],
        }
    );
}

#[test]
fn hidden_fields_only_checked_for_their_record_type() {
    let query = ParsedQuery::new().with_select(["authorId"]);
    let target = apply(query, Recorder::default(), &book_policy(), "author").unwrap();
    assert_eq!(
        target.calls(),
        vec![Call::Select(vec!["authorId".to_owned()])]
    );
}

#[test]
fn ordering_by_hidden_field_is_allowed() {
    let query = ParsedQuery::new().with_order(ODataOrderBy(vec![OrderKey::asc("authorId")]));
    let target = apply(query, Recorder::default(), &book_policy(), "book").unwrap();
    assert_eq!(
        target.calls(),
        vec![Call::Order("authorId".to_owned(), SortDir::Asc)]
    );
}

#[test]
fn visibility_enforcement_can_be_disabled() {
    let policy = book_policy();
    let applier = QueryApplier::new(&policy, "book").enforce_visibility(false);
    assert!(!applier.enforces_visibility());

    let target = applier
        .apply(
            ParsedQuery::new().with_select(["authorId"]),
            Recorder::default(),
        )
        .unwrap();
    assert_eq!(
        target.calls(),
        vec![Call::Select(vec!["authorId".to_owned()])]
    );
}

#[test]
fn unknown_fields_rejected_before_any_modification() {
    let recorder = Recorder::with_fields(&["id", "title"]);
    let log = Rc::clone(&recorder.log);

    let query = ParsedQuery::new()
        .with_top(3)
        .with_order(ODataOrderBy(vec![OrderKey::asc("missing")]));
    let err = apply(query, recorder.clone(), &NoHiddenFields, "book").unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::UnknownField {
            context: "$orderby",
            field: "missing".to_owned(),
        })
    );

    let query = ParsedQuery::new().with_select(["title", "nope"]);
    let err = apply(query, recorder, &NoHiddenFields, "book").unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::UnknownField {
            context: "$select",
            field: "nope".to_owned(),
        })
    );

    assert!(log.borrow().is_empty());
}

#[test]
fn backend_errors_propagate() {
    let query = ParsedQuery::new().with_order(ODataOrderBy(vec![OrderKey::asc("explode")]));
    let err = apply(query, Recorder::default(), &NoHiddenFields, "book").unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
}

#[test]
fn works_with_dyn_policy() {
    let policy = book_policy();
    let dyn_policy: &dyn crate::VisibilityPolicy = &policy;
    let applier = QueryApplier::new(dyn_policy, "book");
    assert_eq!(applier.record_type(), "book");
    assert!(applier
        .apply(ParsedQuery::new().with_select(["authorId"]), Recorder::default())
        .is_err());
}

#[test]
#[tracing_test::traced_test]
fn hidden_field_rejection_is_logged() {
    let query = ParsedQuery::new().with_select(["authorId"]);
    assert!(apply(query, Recorder::default(), &book_policy(), "book").is_err());
    assert!(logs_contain("rejected $select of hidden fields"));
}
