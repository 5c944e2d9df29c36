//! In-memory [`Queryable`] over JSON object rows.
//!
//! Modifications are recorded and only evaluated by [`MemoryQuery::rows`],
//! which follows SQL semantics regardless of call order: ORDER BY, then
//! OFFSET, then LIMIT, then the projection.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::{Error, OrderKey, Queryable, SortDir, VisibilityPolicy};

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct MemoryQuery {
    rows: Vec<Row>,
    select: Option<Vec<String>>,
    limit: Option<u64>,
    offset: Option<u64>,
    order: Vec<OrderKey>,
}

impl MemoryQuery {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Build from a JSON array of objects.
    ///
    /// # Errors
    /// Returns `Error::Backend` if `value` is not an array or contains a non-object item.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        let Value::Array(items) = value else {
            return Err(Error::Backend("expected a JSON array of objects".to_owned()));
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(Error::Backend(format!(
                    "row {idx} is a {}, expected an object",
                    json_type(&other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(rows))
    }

    #[must_use]
    pub fn selected_fields(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    #[must_use]
    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    #[must_use]
    pub fn ordering(&self) -> &[OrderKey] {
        &self.order
    }

    /// Evaluate the query and return the resulting rows.
    #[must_use]
    pub fn rows(self) -> Vec<Value> {
        let Self {
            mut rows,
            select,
            limit,
            offset,
            order,
        } = self;

        if !order.is_empty() {
            // sort_by is stable: rows equal on every key keep their source order
            rows.sort_by(|a, b| compare_rows(a, b, &order));
        }

        let skip = offset.map_or(0, saturating_usize);
        let take = limit.map_or(usize::MAX, saturating_usize);

        rows.into_iter()
            .skip(skip)
            .take(take)
            .map(|row| match &select {
                Some(fields) => Value::Object(project(&row, fields)),
                None => Value::Object(row),
            })
            .collect()
    }

    /// Same as [`Self::rows`], with the policy's hidden fields of
    /// `record_type` removed from every row.
    #[must_use]
    pub fn rows_visible<P>(self, policy: &P, record_type: &str) -> Vec<Value>
    where
        P: VisibilityPolicy + ?Sized,
    {
        let hidden = policy.hidden_fields(record_type);
        let mut rows = self.rows();
        if !hidden.is_empty() {
            for row in &mut rows {
                if let Value::Object(map) = row {
                    map.retain(|key, _| !hidden.contains(key));
                }
            }
        }
        rows
    }
}

impl Queryable for MemoryQuery {
    fn restrict_fields(mut self, fields: &[String]) -> Result<Self, Error> {
        self.select = Some(fields.to_vec());
        Ok(self)
    }

    fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    fn offset(mut self, count: u64) -> Self {
        self.offset = Some(count);
        self
    }

    fn add_ordering(mut self, field: &str, dir: SortDir) -> Result<Self, Error> {
        self.order.push(OrderKey::new(field, dir));
        Ok(self)
    }

    fn has_field(&self, field: &str) -> bool {
        self.rows.is_empty() || self.rows.iter().any(|row| row.contains_key(field))
    }
}

fn saturating_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn project(row: &Row, fields: &[String]) -> Row {
    let mut projected = Map::new();
    for field in fields {
        if let Some(value) = row.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }
    projected
}

fn compare_rows(a: &Row, b: &Row, order: &[OrderKey]) -> Ordering {
    for key in order {
        let ord = compare_values(a.get(&key.field), b.get(&key.field));
        let ord = match key.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

// Missing and null sort first; then bool < number < string. Arrays and
// objects have no meaningful order and compare equal to each other.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_numbers(x: &serde_json::Number, y: &serde_json::Number) -> Ordering {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x.cmp(&y);
    }
    let x = x.as_f64().unwrap_or(f64::NAN);
    let y = y.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
