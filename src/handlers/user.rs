use axum::extract::Query;
use serde::Deserialize;
use serde_json::Value;

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<i64>,
}

/// GET /api/user?username= - A single user by name
pub async fn get(Query(query): Query<UserQuery>) -> ApiResult<Value> {
    let username = query
        .username
        .ok_or_else(|| ApiError::bad_request("The 'username' query parameter is required"))?;

    let pool = Database::pool().await?;
    let user = UserService::new(pool).by_name(&username).await?;
    Ok(ApiResponse::success(views::user_view(&user, super::base_url())))
}

/// GET /api/user/search?query= - Substring search over active users.
/// Backs the auto-complete URLs advertised in field metadata.
pub async fn search(Query(query): Query<SearchQuery>) -> ApiResult<Value> {
    let term = query.query.unwrap_or_default();
    let limit = query.max_results.unwrap_or(50).clamp(1, 1000);

    let pool = Database::pool().await?;
    let users = UserService::new(pool).search(&term, limit).await?;
    Ok(ApiResponse::success(Value::Array(
        users
            .iter()
            .map(|u| views::user_view(u, super::base_url()))
            .collect(),
    )))
}
