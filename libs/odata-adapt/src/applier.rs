//! Validate a [`ParsedQuery`] against a visibility policy and apply it to a [`Queryable`].

use crate::{Error, ParsedQuery, Queryable, ValidationError, VisibilityPolicy};

/// Applies parsed queries for one record type under a visibility policy.
///
/// Validation always runs to completion before the first modification, so a
/// rejected query never leaves the target partially modified. Modifications
/// are issued in a fixed order: projection, limit, offset, ordering.
#[must_use]
pub struct QueryApplier<'a, P: ?Sized> {
    policy: &'a P,
    record_type: String,
    enforce_visibility: bool,
}

impl<'a, P> QueryApplier<'a, P>
where
    P: VisibilityPolicy + ?Sized,
{
    pub fn new(policy: &'a P, record_type: impl Into<String>) -> Self {
        Self {
            policy,
            record_type: record_type.into(),
            enforce_visibility: true,
        }
    }

    /// Turn the hidden-field check on or off (on by default).
    pub fn enforce_visibility(mut self, enforce: bool) -> Self {
        self.enforce_visibility = enforce;
        self
    }

    #[must_use]
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    #[must_use]
    pub fn enforces_visibility(&self) -> bool {
        self.enforce_visibility
    }

    /// Run every check `apply` would run, without touching `target`.
    ///
    /// # Errors
    /// - `ValidationError::HiddenFieldSelected` if `$select` names a hidden field
    /// - `ValidationError::UnknownField` if `$select` or `$orderby` names a field
    ///   the target does not have
    pub fn validate<Q: Queryable>(
        &self,
        query: &ParsedQuery,
        target: &Q,
    ) -> Result<(), ValidationError> {
        if let Some(fields) = query.selected_fields() {
            if self.enforce_visibility {
                self.check_hidden(fields)?;
            }
            if let Some(field) = fields.iter().find(|f| !target.has_field(f)) {
                return Err(ValidationError::UnknownField {
                    context: "$select",
                    field: field.clone(),
                });
            }
        }

        if let Some(order) = query.order()
            && let Some(key) = order.iter().find(|k| !target.has_field(&k.field))
        {
            return Err(ValidationError::UnknownField {
                context: "$orderby",
                field: key.field.clone(),
            });
        }

        Ok(())
    }

    fn check_hidden(&self, fields: &[String]) -> Result<(), ValidationError> {
        let hidden = self.policy.hidden_fields(&self.record_type);
        if hidden.is_empty() {
            return Ok(());
        }

        let mut offending: Vec<String> = Vec::new();
        for field in fields {
            if hidden.contains(field) && !offending.contains(field) {
                offending.push(field.clone());
            }
        }

        if offending.is_empty() {
            return Ok(());
        }

        tracing::warn!(
            record_type = %self.record_type,
            fields = ?offending,
            "rejected $select of hidden fields"
        );
        Err(ValidationError::HiddenFieldSelected {
            record_type: self.record_type.clone(),
            fields: offending,
        })
    }

    /// Validate `query`, then apply it to `target`.
    ///
    /// An empty query returns `target` untouched.
    ///
    /// # Errors
    /// Returns `Error::Validation` (see [`Self::validate`]) before any
    /// modification, or the error of a target that rejects a modification.
    pub fn apply<Q: Queryable>(&self, query: ParsedQuery, target: Q) -> Result<Q, Error> {
        self.validate(&query, &target)?;

        let ParsedQuery {
            select,
            top,
            skip,
            order_by,
        } = query;
        let mut target = target;

        if let Some(fields) = select {
            tracing::debug!(record_type = %self.record_type, ?fields, "applying $select");
            target = target.restrict_fields(&fields)?;
        }

        if let Some(top) = top {
            tracing::debug!(record_type = %self.record_type, top, "applying $top");
            target = target.limit(top);
        }

        if let Some(skip) = skip {
            tracing::debug!(record_type = %self.record_type, skip, "applying $skip");
            target = target.offset(skip);
        }

        if let Some(order) = order_by {
            tracing::debug!(record_type = %self.record_type, %order, "applying $orderby");
            for key in &order {
                target = target.add_ordering(&key.field, key.dir)?;
            }
        }

        Ok(target)
    }
}

/// One-shot form of [`QueryApplier::apply`] with visibility enforced.
///
/// # Errors
/// See [`QueryApplier::apply`].
pub fn apply<Q, P>(
    query: ParsedQuery,
    target: Q,
    policy: &P,
    record_type: &str,
) -> Result<Q, Error>
where
    Q: Queryable,
    P: VisibilityPolicy + ?Sized,
{
    QueryApplier::new(policy, record_type).apply(query, target)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[path = "applier_tests.rs"]
mod applier_tests;
