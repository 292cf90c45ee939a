use axum::extract::{Extension, Path};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use uuid::Uuid;

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::attachment_service::AttachmentService;
use crate::services::issue_service::IssueService;
use crate::services::permission::{Permission, PermissionService, PgPermissionService};
use crate::views;

async fn permitted_attachment(
    id: Uuid,
    auth_user: &AuthUser,
    permission: Permission,
) -> Result<(AttachmentService, crate::models::Attachment), ApiError> {
    let pool = Database::pool().await?;
    let attachments = AttachmentService::new(pool.clone());
    let issues = IssueService::new(pool.clone());
    let permissions = PgPermissionService::new(pool);

    let attachment = attachments.get(id).await?;
    let issue = issues.get(&attachment.issue_id.to_string()).await?;
    if !permissions
        .has_permission(auth_user.user_id, issue.project_id, permission)
        .await?
    {
        return Err(ApiError::not_found(format!("Attachment '{}' not found", id)));
    }
    Ok((attachments, attachment))
}

/// GET /api/attachment/:id - Attachment metadata
pub async fn get(
    Path(id): Path<Uuid>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (attachments, attachment) =
        permitted_attachment(id, &auth_user, Permission::Browse).await?;
    let author = attachments.author(&attachment).await?;
    Ok(ApiResponse::success(views::attachment_view(
        &attachment,
        author.as_ref(),
        super::base_url(),
    )))
}

/// GET /api/attachment/:id/content - The raw bytes
pub async fn content(
    Path(id): Path<Uuid>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    let (attachments, attachment) =
        permitted_attachment(id, &auth_user, Permission::Browse).await?;
    let bytes = attachments.content(&attachment).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, attachment.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment.filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/attachment/:id
pub async fn delete(
    Path(id): Path<Uuid>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    let (attachments, attachment) =
        permitted_attachment(id, &auth_user, Permission::Attach).await?;
    attachments.delete(&attachment).await?;
    Ok(ApiResponse::<()>::no_content())
}
