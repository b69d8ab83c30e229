use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::record::Record;

/// Errors from a record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated on {0}")]
    Conflict(String),

    #[error("unknown column: {0}")]
    UnknownField(String),

    #[error("record could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: Direction::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: Direction::Desc }
    }

    /// Parse `field` (ascending) or `-field` (descending)
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(raw),
        }
    }
}

/// Equality filters, ordering and limit for `find_many`.
///
/// Filters match by JSON containment: every key in `filter` must be present
/// in the record with an equal value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Map<String, Value>,
    pub order: Option<Order>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject filters or orderings on columns the record does not have
    pub fn check<R: Record>(&self) -> Result<(), StoreError> {
        let fields = self
            .filter
            .keys()
            .map(String::as_str)
            .chain(self.order.as_ref().map(|o| o.field.as_str()));
        for field in fields {
            if !R::has_column(field) {
                return Err(StoreError::UnknownField(field.to_string()));
            }
        }
        Ok(())
    }
}

/// Storage collaborator for one record type
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError>;

    async fn find_many(&self, query: &ListQuery) -> Result<Vec<R>, StoreError>;

    /// Insert a fully populated record and return it as stored
    async fn create(&self, record: &R) -> Result<R, StoreError>;

    /// Replace the stored record with the same id. `NotFound` if absent.
    async fn update(&self, record: &R) -> Result<R, StoreError>;

    /// Remove by id. `NotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn find_one(&self, query: &ListQuery) -> Result<Option<R>, StoreError> {
        let query = query.clone().limit(1);
        Ok(self.find_many(&query).await?.into_iter().next())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_direction() {
        assert_eq!(Order::parse("sort_order"), Order::asc("sort_order"));
        assert_eq!(Order::parse("-created_at"), Order::desc("created_at"));
    }
}
