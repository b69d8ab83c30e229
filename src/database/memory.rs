use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::record::Record;
use super::store::{Direction, ListQuery, RecordStore, StoreError};

/// In-process store used when no database is configured and in tests.
/// Insertion order is kept so unordered listings are stable.
pub struct MemoryStore<R> {
    rows: RwLock<Vec<R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self { rows: RwLock::new(Vec::new()) }
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self { rows: RwLock::new(records) }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    fn as_object(record: &R) -> Result<Map<String, Value>, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Backend(format!(
                "{} record serialized to non-object {}",
                R::TABLE,
                other
            ))),
        }
    }

    fn check_unique(rows: &[R], candidate: &R) -> Result<(), StoreError> {
        if R::UNIQUE.is_empty() {
            return Ok(());
        }
        let new = Self::as_object(candidate)?;
        for row in rows.iter().filter(|r| r.id() != candidate.id()) {
            let existing = Self::as_object(row)?;
            for column in R::UNIQUE {
                if new.get(*column).is_some() && new.get(*column) == existing.get(*column) {
                    return Err(StoreError::Conflict(column.to_string()));
                }
            }
        }
        Ok(())
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(object: &Map<String, Value>, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(k, v)| object.get(k) == Some(v))
}

/// Ordering for JSON scalars. RFC 3339 strings compare as instants and
/// decimal strings (prices) as numbers. NULL sorts above every value, as in
/// Postgres: last ascending, first descending.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => match (x.parse::<Decimal>(), y.parse::<Decimal>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                },
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.id() == id).cloned())
    }

    async fn find_many(&self, query: &ListQuery) -> Result<Vec<R>, StoreError> {
        query.check::<R>()?;

        let rows = self.rows.read().await;
        let mut hits = Vec::new();
        for row in rows.iter() {
            let object = Self::as_object(row)?;
            if matches(&object, &query.filter) {
                hits.push((object, row.clone()));
            }
        }
        drop(rows);

        if let Some(order) = &query.order {
            hits.sort_by(|(a, _), (b, _)| {
                let null = Value::Null;
                let ord = compare_values(
                    a.get(&order.field).unwrap_or(&null),
                    b.get(&order.field).unwrap_or(&null),
                );
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        let limit = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(hits.into_iter().take(limit).map(|(_, r)| r).collect())
    }

    async fn create(&self, record: &R) -> Result<R, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::Conflict("id".to_string()));
        }
        Self::check_unique(&rows, record)?;
        rows.push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &R) -> Result<R, StoreError> {
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, record)?;
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(StoreError::NotFound)?;
        *slot = record.clone();
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
