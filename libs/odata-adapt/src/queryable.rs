use crate::{Error, SortDir};

/// A builder-like query target that the applier narrows before execution.
///
/// Implementations take `self` by value and hand back the modified target,
/// the same way query builders such as `sea_orm::Select` are chained. The
/// applier never executes the query; materialization is the caller's business.
pub trait Queryable: Sized {
    /// Restrict the returned fields to exactly `fields`, in that order.
    ///
    /// # Errors
    /// Returns `Error::Backend` (or a validation error) if the target cannot
    /// project onto the requested fields.
    fn restrict_fields(self, fields: &[String]) -> Result<Self, Error>;

    /// Return at most `count` results.
    #[must_use]
    fn limit(self, count: u64) -> Self;

    /// Skip the first `count` results.
    #[must_use]
    fn offset(self, count: u64) -> Self;

    /// Append an ordering criterion after the ones already added.
    ///
    /// # Errors
    /// Returns `Error::Backend` (or a validation error) if the target cannot
    /// order by `field`.
    fn add_ordering(self, field: &str, dir: SortDir) -> Result<Self, Error>;

    /// Whether `field` names something this target can select or order by.
    ///
    /// Used to reject unknown fields before any modification is applied.
    /// Targets without a fixed schema keep the default.
    fn has_field(&self, _field: &str) -> bool {
        true
    }
}
