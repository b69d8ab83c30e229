//! Public lookups by natural key for the landing page.

use axum::extract::{Path, State};
use serde_json::Value;

use crate::app::AppState;
use crate::database::ListQuery;
use crate::error::{ApiError, LogOperation};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{BlogPost, Product, Setting};

/// GET /api/blogs/:slug - drafts are indistinguishable from missing posts
pub async fn blog_by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<BlogPost> {
    let query = ListQuery::new().eq("slug", slug).eq("published", true);
    let post = state
        .stores
        .blogs
        .find_one(&query)
        .await
        .log_operation("blogs.by_slug")?
        .ok_or_else(ApiError::not_found)?;
    Ok(ApiResponse::success(post))
}

/// GET /api/products/:slug - only active packages
pub async fn product_by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Product> {
    let query = ListQuery::new().eq("slug", slug).eq("active", true);
    let product = state
        .stores
        .products
        .find_one(&query)
        .await
        .log_operation("products.by_slug")?
        .ok_or_else(ApiError::not_found)?;
    Ok(ApiResponse::success(product))
}

/// GET /api/settings/:key
pub async fn setting_by_key(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Setting> {
    let setting = state
        .stores
        .settings
        .find_one(&ListQuery::new().eq("key", Value::String(key)))
        .await
        .log_operation("settings.by_key")?
        .ok_or_else(ApiError::not_found)?;
    Ok(ApiResponse::success(setting))
}
