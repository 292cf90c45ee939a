use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::Database;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::comment_service::CommentService;
use crate::services::permission::{Permission, PermissionService, PgPermissionService};
use crate::views;

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub body: String,
}

/// GET /api/issue/:key/comment
pub async fn list(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, _issues) = super::browseable_issue(&key, &auth_user).await?;

    let pool = Database::pool().await?;
    let comments = CommentService::new(pool).list(&issue).await?;

    Ok(ApiResponse::success(json!({
        "total": comments.len(),
        "comments": comments
            .iter()
            .map(|(c, author)| views::comment_view(c, author.as_ref(), &issue.key, crate::handlers::base_url()))
            .collect::<Vec<_>>(),
    })))
}

/// POST /api/issue/:key/comment
pub async fn add(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CommentBody>,
) -> ApiResult<Value> {
    let (issue, _issues) = super::browseable_issue(&key, &auth_user).await?;
    super::require_permission(
        &auth_user,
        issue.project_id,
        Permission::Comment,
        "comment on this issue",
    )
    .await?;

    let pool = Database::pool().await?;
    let service = CommentService::new(pool);
    let comment = service.add(&issue, auth_user.user_id, &body.body).await?;

    Ok(ApiResponse::created(views::comment_view(
        &comment,
        None,
        &issue.key,
        crate::handlers::base_url(),
    )))
}

/// GET /api/issue/:key/comment/:id
pub async fn get(
    Path((key, id)): Path<(String, Uuid)>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;

    let pool = Database::pool().await?;
    let service = CommentService::new(pool);
    let comment = service.get(&issue, id).await?;
    let author = issues.user_by_id(comment.author_id).await?;

    Ok(ApiResponse::success(views::comment_view(
        &comment,
        author.as_ref(),
        &issue.key,
        crate::handlers::base_url(),
    )))
}

/// PUT /api/issue/:key/comment/:id - Author or project admin only
pub async fn update(
    Path((key, id)): Path<(String, Uuid)>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CommentBody>,
) -> ApiResult<Value> {
    let (issue, _issues) = super::browseable_issue(&key, &auth_user).await?;

    let pool = Database::pool().await?;
    let service = CommentService::new(pool.clone());
    let permissions = PgPermissionService::new(pool);

    let comment = service.get(&issue, id).await?;
    let is_admin = permissions
        .has_permission(auth_user.user_id, issue.project_id, Permission::Administer)
        .await?;
    let updated = service
        .update(&comment, auth_user.user_id, is_admin, &body.body)
        .await?;

    Ok(ApiResponse::success(views::comment_view(
        &updated,
        None,
        &issue.key,
        crate::handlers::base_url(),
    )))
}

/// DELETE /api/issue/:key/comment/:id - Author or project admin only
pub async fn delete(
    Path((key, id)): Path<(String, Uuid)>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    let (issue, _issues) = super::browseable_issue(&key, &auth_user).await?;

    let pool = Database::pool().await?;
    let service = CommentService::new(pool.clone());
    let permissions = PgPermissionService::new(pool);

    let comment = service.get(&issue, id).await?;
    let is_admin = permissions
        .has_permission(auth_user.user_id, issue.project_id, Permission::Administer)
        .await?;
    service.delete(&comment, auth_user.user_id, is_admin).await?;

    Ok(ApiResponse::<()>::no_content())
}
