//! Explicit entry points that turn a request URL into an adapted `SeaORM` query.

use std::collections::BTreeSet;
use std::marker::PhantomData;

use odata_adapt::{Error, QueryApplier, QueryStringParser, VisibilityPolicy};
use sea_orm::{EntityTrait, Select};

use crate::SeaQuery;

/// Entities whose queries can be adapted from an OData-style URL.
///
/// Visibility is always enforced from [`Self::HIDDEN_FIELDS`]: they are
/// rejected in `$select` and removed from rows returned by
/// [`SeaQuery::all_json`].
///
/// ```ignore
/// impl ODataAdaptable for book::Entity {
///     const HIDDEN_FIELDS: &'static [&'static str] = &["authorId"];
/// }
///
/// let rows = book::Entity::adapt(request_url)?.all_json(&conn).await?;
/// ```
pub trait ODataAdaptable: EntityTrait {
    /// Column names that may never appear in `$select`.
    const HIDDEN_FIELDS: &'static [&'static str] = &[];

    /// Record type reported in validation errors; the table name by default.
    #[must_use]
    fn record_type() -> String {
        Self::default().table_name().to_owned()
    }

    /// Adapt `Self::find()` to the query string of `url`.
    ///
    /// # Errors
    /// Returns a parse error for a malformed query string, or a validation
    /// error for hidden or unknown fields.
    fn adapt(url: &str) -> Result<SeaQuery<Self>, Error> {
        Self::find().adapt(url)
    }
}

/// Adapt an already-built `Select<E>` (for example one carrying a filter).
pub trait ODataAdaptExt<E: ODataAdaptable>: Sized {
    /// Apply the query string of `url` on top of this query.
    ///
    /// # Errors
    /// See [`ODataAdaptable::adapt`].
    fn adapt(self, url: &str) -> Result<SeaQuery<E>, Error> {
        self.adapt_with(&QueryStringParser::default(), url)
    }

    /// Same as [`Self::adapt`], parsing with a configured parser.
    ///
    /// # Errors
    /// See [`ODataAdaptable::adapt`].
    fn adapt_with(self, parser: &QueryStringParser, url: &str) -> Result<SeaQuery<E>, Error>;
}

impl<E: ODataAdaptable> ODataAdaptExt<E> for Select<E> {
    fn adapt_with(self, parser: &QueryStringParser, url: &str) -> Result<SeaQuery<E>, Error> {
        let query = parser.parse_url(url)?;
        let policy = EntityVisibility::<E>::new();
        let record_type = E::record_type();

        tracing::debug!(record_type = %record_type, url, "adapting query");
        QueryApplier::new(&policy, record_type)
            .apply(query, SeaQuery::new(self).hide_fields(E::HIDDEN_FIELDS))
    }
}

/// Visibility policy backed by an entity's [`ODataAdaptable::HIDDEN_FIELDS`].
pub struct EntityVisibility<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: ODataAdaptable> EntityVisibility<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E: ODataAdaptable> Default for EntityVisibility<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ODataAdaptable> VisibilityPolicy for EntityVisibility<E> {
    // The entity type already pins the record type.
    fn hidden_fields(&self, _record_type: &str) -> BTreeSet<String> {
        E::HIDDEN_FIELDS.iter().map(|f| (*f).to_owned()).collect()
    }

    fn is_hidden(&self, _record_type: &str, field: &str) -> bool {
        E::HIDDEN_FIELDS.iter().any(|f| *f == field)
    }
}
