use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::UserService;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct UnwatchQuery {
    pub username: Option<String>,
}

/// GET /api/issue/:key/watchers
pub async fn get(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;

    let (count, is_watching) = issues.watch_state(&issue, auth_user.user_id).await?;
    let watchers = issues.watchers(&issue).await?;

    Ok(ApiResponse::success(json!({
        "self": format!("{}/api/issue/{}/watchers", crate::handlers::base_url(), issue.key),
        "watchCount": count,
        "isWatching": is_watching,
        "watchers": watchers
            .iter()
            .map(|u| views::user_ref(u, crate::handlers::base_url()))
            .collect::<Vec<_>>(),
    })))
}

/// POST /api/issue/:key/watchers - Add a watcher. An empty body (or JSON
/// null) adds the caller; a JSON string names another user.
pub async fn add(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    body: Option<Json<Value>>,
) -> ApiResult<()> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;

    let watcher_id = match body {
        None | Some(Json(Value::Null)) => auth_user.user_id,
        Some(Json(Value::String(name))) if name.is_empty() => auth_user.user_id,
        Some(Json(Value::String(name))) => {
            let pool = Database::pool().await?;
            UserService::new(pool).by_name(&name).await?.id
        }
        Some(_) => return Err(ApiError::bad_request("Expected a JSON string username")),
    };

    issues.add_watcher(&issue, watcher_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// DELETE /api/issue/:key/watchers?username= - Remove a watcher
pub async fn remove(
    Path(key): Path<String>,
    Query(query): Query<UnwatchQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    let username = query
        .username
        .ok_or_else(|| ApiError::bad_request("The 'username' query parameter is required"))?;

    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    let pool = Database::pool().await?;
    let user = UserService::new(pool).by_name(&username).await?;

    issues.remove_watcher(&issue, user.id).await?;
    Ok(ApiResponse::<()>::no_content())
}
