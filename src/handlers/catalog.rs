use axum::extract::Path;
use serde_json::{json, Value};

use crate::db::Database;
use crate::fields::FieldCatalog;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::catalog::CatalogService;
use crate::views;

/// GET /api/field - Every system and custom field with its schema
pub async fn fields() -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let custom = CatalogService::new(pool).custom_fields().await?;
    let catalog = FieldCatalog::new(custom);

    let fields: Vec<Value> = catalog
        .iter()
        .map(|def| {
            json!({
                "id": def.id,
                "name": def.name,
                "custom": def.is_custom(),
                "navigable": def.navigable,
                "orderable": def.orderable,
                "schema": def.schema(),
            })
        })
        .collect();

    Ok(ApiResponse::success(Value::Array(fields)))
}

/// GET /api/priority - All priorities, in sequence order
pub async fn priorities() -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let priorities = CatalogService::new(pool).priorities().await?;
    Ok(ApiResponse::success(Value::Array(
        priorities
            .iter()
            .map(|p| views::priority_view(p, super::base_url()))
            .collect(),
    )))
}

/// GET /api/priority/:id
pub async fn priority(Path(id): Path<i64>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let priority = CatalogService::new(pool).priority(id).await?;
    Ok(ApiResponse::success(views::priority_view(
        &priority,
        super::base_url(),
    )))
}

/// GET /api/status
pub async fn statuses() -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let statuses = CatalogService::new(pool).statuses().await?;
    Ok(ApiResponse::success(Value::Array(
        statuses
            .iter()
            .map(|s| views::status_view(s, super::base_url()))
            .collect(),
    )))
}

/// GET /api/status/:id
pub async fn status(Path(id): Path<i64>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let status = CatalogService::new(pool).status(id).await?;
    Ok(ApiResponse::success(views::status_view(
        &status,
        super::base_url(),
    )))
}

/// GET /api/resolution
pub async fn resolutions() -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let resolutions = CatalogService::new(pool).resolutions().await?;
    Ok(ApiResponse::success(Value::Array(
        resolutions
            .iter()
            .map(|r| views::resolution_view(r, super::base_url()))
            .collect(),
    )))
}

/// GET /api/resolution/:id
pub async fn resolution(Path(id): Path<i64>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let resolution = CatalogService::new(pool).resolution(id).await?;
    Ok(ApiResponse::success(views::resolution_view(
        &resolution,
        super::base_url(),
    )))
}
