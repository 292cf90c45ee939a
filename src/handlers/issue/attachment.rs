use axum::extract::{Extension, Multipart, Path};
use serde_json::Value;

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::attachment_service::AttachmentService;
use crate::services::permission::Permission;
use crate::views;

/// POST /api/issue/:key/attachments - Multipart upload; each `file` part
/// becomes one attachment.
pub async fn upload(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    let (issue, _issues) = super::browseable_issue(&key, &auth_user).await?;
    super::require_permission(
        &auth_user,
        issue.project_id,
        Permission::Attach,
        "attach files to this issue",
    )
    .await?;

    let pool = Database::pool().await?;
    let attachments = AttachmentService::new(pool);

    let mut stored = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Multipart file part needs a filename"))?;
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?;

        let attachment = attachments
            .save(&issue, auth_user.user_id, &filename, &mime_type, &bytes)
            .await?;
        stored.push(views::attachment_view(
            &attachment,
            None,
            crate::handlers::base_url(),
        ));
    }

    if stored.is_empty() {
        return Err(ApiError::bad_request(
            "Expected at least one multipart part named 'file'",
        ));
    }

    Ok(ApiResponse::created(Value::Array(stored)))
}
