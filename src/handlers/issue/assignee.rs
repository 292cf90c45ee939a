use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::permission::Permission;

/// PUT /api/issue/:key/assignee - Assign an issue.
/// Body: `{"name": "fred"}`; `{"name": "-1"}` applies the project's
/// automatic assignee; `null` (or `{"name": null}`) clears it.
pub async fn assign(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<()> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    super::require_permission(
        &auth_user,
        issue.project_id,
        Permission::Assign,
        "assign this issue",
    )
    .await?;

    let assignee = match &body {
        Value::Null => None,
        value => value.get("name").and_then(|n| n.as_str()),
    };
    issues.assign(&issue, assignee).await?;
    Ok(ApiResponse::<()>::no_content())
}
