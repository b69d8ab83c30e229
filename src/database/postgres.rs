use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::record::Record;
use super::store::{ListQuery, RecordStore, StoreError};
use crate::config::DatabaseConfig;

/// Schema applied by `umrah-portal init-db`
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Open a connection pool for the configured database
pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url)
        .await?;
    info!("Connected to database (max {} connections)", config.max_connections);
    Ok(pool)
}

/// Run every statement of `SCHEMA_SQL`. Statements are idempotent.
pub async fn apply_schema(pool: &PgPool) -> Result<usize, StoreError> {
    let mut applied = 0;
    for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
        applied += 1;
    }
    Ok(applied)
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Postgres-backed store. Rows are marshalled through JSON: reads use
/// `row_to_json`, writes use `jsonb_populate_record`, so the table's
/// columns must match the record's serialized keys.
pub struct PgStore<R> {
    pool: PgPool,
    _phantom: PhantomData<R>,
}

impl<R: Record> PgStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    fn table() -> String {
        quote_identifier(R::TABLE)
    }

    fn decode(row: &sqlx::postgres::PgRow) -> Result<R, StoreError> {
        let value: Value = row.try_get("row")?;
        Ok(serde_json::from_value(value)?)
    }

    fn map_write_error(err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let column = db
                    .constraint()
                    .and_then(|c| R::UNIQUE.iter().find(|col| c.contains(**col)))
                    .copied()
                    .unwrap_or("id");
                return StoreError::Conflict(column.to_string());
            }
        }
        StoreError::Sqlx(err)
    }

    fn find_many_sql(query: &ListQuery) -> String {
        let mut sql = format!(
            "SELECT row_to_json(t) AS row FROM {} t WHERE to_jsonb(t) @> $1::jsonb",
            Self::table()
        );
        if let Some(order) = &query.order {
            sql.push_str(&format!(
                " ORDER BY t.{} {}",
                quote_identifier(&order.field),
                order.direction.as_sql()
            ));
        }
        sql.push_str(" LIMIT $2");
        sql
    }

    fn update_sql() -> String {
        let columns: Vec<String> = R::COLUMNS
            .iter()
            .filter(|c| **c != "id" && **c != "created_at")
            .map(|c| quote_identifier(c))
            .collect();
        let columns = columns.join(", ");
        format!(
            "UPDATE {table} AS t SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1::jsonb)) \
             WHERE t.id = $2 RETURNING row_to_json(t) AS row",
            table = Self::table(),
        )
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for PgStore<R> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT row_to_json(t) AS row FROM {} t WHERE t.id = $1", Self::table());
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_many(&self, query: &ListQuery) -> Result<Vec<R>, StoreError> {
        query.check::<R>()?;

        let sql = Self::find_many_sql(query);
        let rows = sqlx::query(&sql)
            .bind(Value::Object(query.filter.clone()))
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::decode).collect()
    }

    async fn create(&self, record: &R) -> Result<R, StoreError> {
        let sql = format!(
            "INSERT INTO {table} AS t SELECT * FROM jsonb_populate_record(NULL::{table}, $1::jsonb) \
             RETURNING row_to_json(t) AS row",
            table = Self::table()
        );
        let row = sqlx::query(&sql)
            .bind(serde_json::to_value(record)?)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_write_error)?;
        Self::decode(&row)
    }

    async fn update(&self, record: &R) -> Result<R, StoreError> {
        let row = sqlx::query(&Self::update_sql())
            .bind(serde_json::to_value(record)?)
            .bind(record.id())
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_write_error)?;
        match row {
            Some(row) => Self::decode(&row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
