//! Generic CRUD handlers shared by every dashboard-managed resource.

use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::app::{AppState, HasStore, Stores};
use crate::database::{ListQuery, Order};
use crate::error::{ApiError, LogOperation, VALIDATION_MESSAGE};
use crate::middleware::{ApiResponse, ApiResult, RequireSession, ValidJson};
use crate::models::{FilterKind, Resource};

pub const MAX_LIMIT: i64 = 500;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

fn operation<R: Resource>(action: &str) -> String {
    format!("{}.{}", R::COLLECTION, action)
}

/// Ids that are not UUIDs cannot exist
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found())
}

fn filter_kind<R: Resource>(field: &str) -> Option<FilterKind> {
    R::FILTERS.iter().find(|(name, _)| *name == field).map(|(_, kind)| *kind)
}

/// Build a store query from `?order=-field&limit=n&<filter>=<value>`
pub fn list_query<R: Resource>(params: &HashMap<String, String>) -> Result<ListQuery, ApiError> {
    let mut query = ListQuery::new().order_by(R::default_order());

    for (key, raw) in params {
        match key.as_str() {
            "order" => {
                let order = Order::parse(raw);
                if !R::has_column(&order.field) {
                    return Err(ApiError::validation(VALIDATION_MESSAGE).with_field("order", "kolom tidak dikenal"));
                }
                query = query.order_by(order);
            }
            "limit" => {
                let limit = raw
                    .parse::<i64>()
                    .ok()
                    .filter(|l| (1..=MAX_LIMIT).contains(l))
                    .ok_or_else(|| {
                        ApiError::validation(VALIDATION_MESSAGE)
                            .with_field("limit", format!("harus angka 1 sampai {MAX_LIMIT}"))
                    })?;
                query = query.limit(limit);
            }
            field => {
                let kind = filter_kind::<R>(field).ok_or_else(|| {
                    ApiError::validation(VALIDATION_MESSAGE).with_field(field, "parameter tidak dikenal")
                })?;
                let value = kind.parse(raw).ok_or_else(|| {
                    ApiError::validation(VALIDATION_MESSAGE).with_field(field, "nilai tidak sesuai tipe kolom")
                })?;
                query = query.eq(field, value);
            }
        }
    }

    Ok(query)
}

/// GET /api/<collection> - public listing, restricted by `Resource::public_filter`
pub async fn list_public<R>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<R>>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let mut query = list_query::<R>(&params)?;
    query.filter.extend(R::public_filter());

    let records = HasStore::<R>::store(&state.stores)
        .find_many(&query)
        .await
        .log_operation(&operation::<R>("list"))?;
    Ok(ApiResponse::success(records))
}

/// GET /api/admin/<collection> - everything, including inactive rows
pub async fn list_all<R>(
    State(state): State<AppState>,
    _session: RequireSession,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<R>>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let query = list_query::<R>(&params)?;
    let records = HasStore::<R>::store(&state.stores)
        .find_many(&query)
        .await
        .log_operation(&operation::<R>("list_all"))?;
    Ok(ApiResponse::success(records))
}

/// GET /api/admin/<collection>/:id
pub async fn get_one<R>(
    State(state): State<AppState>,
    _session: RequireSession,
    Path(id): Path<String>,
) -> ApiResult<R>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let id = parse_id(&id)?;
    let record = HasStore::<R>::store(&state.stores)
        .find_by_id(id)
        .await
        .log_operation(&operation::<R>("get"))?
        .ok_or_else(ApiError::not_found)?;
    Ok(ApiResponse::success(record))
}

/// POST /api/<collection> and /api/admin/<collection>
pub async fn create<R>(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    ValidJson(input): ValidJson<R::Create>,
) -> ApiResult<R>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let record = R::create(input, Uuid::new_v4(), Utc::now());
    let saved = HasStore::<R>::store(&state.stores)
        .create(&record)
        .await
        .log_operation(&operation::<R>("create"))?;

    tracing::info!(collection = R::COLLECTION, id = %saved.id(), by = %session.email, "record created");
    Ok(ApiResponse::created(saved))
}

/// PUT /api/<collection>/:id and /api/admin/<collection>/:id
pub async fn update<R>(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<R::Update>,
) -> ApiResult<R>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let id = parse_id(&id)?;
    let store = HasStore::<R>::store(&state.stores);

    let mut record = store
        .find_by_id(id)
        .await
        .log_operation(&operation::<R>("update"))?
        .ok_or_else(ApiError::not_found)?;
    record.apply(input, Utc::now());

    let saved = store.update(&record).await.log_operation(&operation::<R>("update"))?;

    tracing::info!(collection = R::COLLECTION, id = %id, by = %session.email, "record updated");
    Ok(ApiResponse::success(saved))
}

/// DELETE /api/<collection>/:id and /api/admin/<collection>/:id
pub async fn delete<R>(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(id): Path<String>,
) -> ApiResult<Deleted>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let id = parse_id(&id)?;
    HasStore::<R>::store(&state.stores)
        .delete(id)
        .await
        .log_operation(&operation::<R>("delete"))?;

    tracing::info!(collection = R::COLLECTION, id = %id, by = %session.email, "record deleted");
    Ok(ApiResponse::success(Deleted { id }))
}
