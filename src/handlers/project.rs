use axum::extract::{Extension, Path};
use serde_json::Value;

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::permission::{Permission, PermissionService, PgPermissionService};
use crate::services::project_service::ProjectService;
use crate::views;

/// GET /api/project - Projects the caller can browse
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let projects = ProjectService::new(pool);

    let visible = projects.browseable(auth_user.user_id).await?;
    let mut views_out = Vec::with_capacity(visible.len());
    for project in &visible {
        let lead = projects.lead(project).await?;
        views_out.push(views::project_view(project, &lead, super::base_url()));
    }
    Ok(ApiResponse::success(Value::Array(views_out)))
}

/// GET /api/project/:key
pub async fn get(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let projects = ProjectService::new(pool.clone());
    let permissions = PgPermissionService::new(pool);

    let project = projects.by_key(&key).await?;
    // No browse permission reads the same as no project
    if !permissions
        .has_permission(auth_user.user_id, project.id, Permission::Browse)
        .await?
    {
        return Err(ApiError::not_found(format!("Project '{}' not found", key)));
    }

    let lead = projects.lead(&project).await?;
    Ok(ApiResponse::success(views::project_view(
        &project,
        &lead,
        super::base_url(),
    )))
}
