//! [`Queryable`] over a `SeaORM` `Select<E>`.
//!
//! Field names resolve to `E::Column` by exact column name, so the same
//! names a client sees in JSON rows are the ones it can select and order by.

use odata_adapt::{Error, Queryable, SortDir, ValidationError};
use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, IdenStatic, Iterable, QueryOrder, QuerySelect,
    QueryTrait, Select, Statement, sea_query::Order,
};

#[must_use]
pub struct SeaQuery<E: EntityTrait> {
    select: Select<E>,
    hidden: &'static [&'static str],
}

impl<E: EntityTrait> SeaQuery<E> {
    pub fn new(select: Select<E>) -> Self {
        Self { select, hidden: &[] }
    }

    /// Start from `E::find()`.
    pub fn find() -> Self {
        Self::new(E::find())
    }

    /// Columns removed from every row returned by [`Self::all_json`].
    pub fn hide_fields(mut self, fields: &'static [&'static str]) -> Self {
        self.hidden = fields;
        self
    }

    #[must_use]
    pub fn hidden_fields(&self) -> &'static [&'static str] {
        self.hidden
    }

    pub fn into_select(self) -> Select<E> {
        self.select
    }

    /// Resolve an API field name to the entity column with that exact name.
    #[must_use]
    pub fn column(field: &str) -> Option<E::Column> {
        E::Column::iter().find(|col| col.as_str() == field)
    }

    /// SQL for the current state of the query, with values inlined.
    #[must_use]
    pub fn build(&self, conn: &impl ConnectionTrait) -> Statement {
        self.select.build(conn.get_database_backend())
    }

    /// Execute the query and return every row as a JSON object, without
    /// the hidden fields.
    ///
    /// Rows are returned as JSON because a projected query no longer carries
    /// every column of `E::Model`.
    ///
    /// # Errors
    /// Returns `DbErr` if the query fails.
    pub async fn all_json<C: ConnectionTrait>(
        self,
        conn: &C,
    ) -> Result<Vec<serde_json::Value>, DbErr> {
        let hidden = self.hidden;
        let mut rows = self.select.into_json().all(conn).await?;
        if !hidden.is_empty() {
            for row in &mut rows {
                if let serde_json::Value::Object(map) = row {
                    map.retain(|key, _| !hidden.contains(&key.as_str()));
                }
            }
        }
        Ok(rows)
    }

    fn resolve(context: &'static str, field: &str) -> Result<E::Column, Error> {
        Self::column(field).ok_or_else(|| {
            ValidationError::UnknownField {
                context,
                field: field.to_owned(),
            }
            .into()
        })
    }
}

impl<E: EntityTrait> From<Select<E>> for SeaQuery<E> {
    fn from(select: Select<E>) -> Self {
        Self::new(select)
    }
}

impl<E: EntityTrait> Queryable for SeaQuery<E> {
    fn restrict_fields(mut self, fields: &[String]) -> Result<Self, Error> {
        let mut select = self.select.select_only();
        for field in fields {
            select = select.column(Self::resolve("$select", field)?);
        }
        self.select = select;
        Ok(self)
    }

    fn limit(mut self, count: u64) -> Self {
        self.select = QuerySelect::limit(self.select, count);
        self
    }

    fn offset(mut self, count: u64) -> Self {
        self.select = QuerySelect::offset(self.select, count);
        self
    }

    fn add_ordering(mut self, field: &str, dir: SortDir) -> Result<Self, Error> {
        let col = Self::resolve("$orderby", field)?;
        let order = match dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        };
        self.select = self.select.order_by(col, order);
        Ok(self)
    }

    fn has_field(&self, field: &str) -> bool {
        Self::column(field).is_some()
    }
}
