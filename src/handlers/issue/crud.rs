use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::Database;
use crate::error::ApiError;
use crate::fields::{FieldCatalog, IncludedFields};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::catalog::CatalogService;
use crate::services::issue_input;
use crate::services::issue_service::IssueService;
use crate::services::permission::Permission;
use crate::services::ServiceError;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct IssueQuery {
    /// Comma-separated field selector: `summary,-comment,*all,*navigable`
    pub fields: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "deleteSubtasks")]
    pub delete_subtasks: Option<String>,
}

/// GET /api/issue/:key - Full issue representation.
/// All fields are returned by default; the `fields` parameter narrows it.
pub async fn get(
    Path(key): Path<String>,
    Query(query): Query<IssueQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;

    let params: Vec<String> = query.fields.into_iter().collect();
    let include = IncludedFields::include_all_by_default(&params);

    let pool = Database::pool().await?;
    let catalog = FieldCatalog::new(CatalogService::new(pool).custom_fields().await?);
    let data = issues.view_data(issue, auth_user.user_id).await?;

    Ok(ApiResponse::success(views::issue::issue_view(
        &data,
        &catalog,
        &include,
        crate::handlers::base_url(),
    )))
}

/// POST /api/issue - Create an issue or sub-task
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let issues = IssueService::new(pool);

    // The project must be resolved before the permission gate
    let project_value = body
        .get("fields")
        .and_then(|f| f.get("project"))
        .ok_or_else(|| ApiError::validation_error("'project' is required", None))?;
    let project = resolve_project(&issues, project_value).await?;
    super::require_permission(
        &auth_user,
        project.id,
        Permission::Create,
        "create issues in this project",
    )
    .await?;

    let issue = issues.create(auth_user.user_id, &body).await?;
    Ok(ApiResponse::created(json!({
        "id": issue.id,
        "key": issue.key,
        "self": format!("{}/api/issue/{}", crate::handlers::base_url(), issue.key),
    })))
}

/// POST /api/issue/bulk - Create many issues in one request.
/// Each element succeeds or fails independently.
pub async fn create_bulk(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let updates = body
        .get("issueUpdates")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ApiError::validation_error("'issueUpdates' must be an array", None))?;

    let pool = Database::pool().await?;
    let issues = IssueService::new(pool);

    let mut created = Vec::new();
    let mut errors = Vec::new();
    for (index, element) in updates.iter().enumerate() {
        match create_one(&issues, &auth_user, element).await {
            Ok(issue) => created.push(json!({
                "id": issue.id,
                "key": issue.key,
                "self": format!("{}/api/issue/{}", crate::handlers::base_url(), issue.key),
            })),
            Err(err) => errors.push(json!({
                "status": err.status_code(),
                "failedElementNumber": index,
                "elementErrors": err.to_json(),
            })),
        }
    }

    Ok(ApiResponse::created(json!({
        "issues": created,
        "errors": errors,
    })))
}

async fn create_one(
    issues: &IssueService,
    auth_user: &AuthUser,
    element: &Value,
) -> Result<crate::models::Issue, ApiError> {
    let project_value = element
        .get("fields")
        .and_then(|f| f.get("project"))
        .ok_or_else(|| ApiError::validation_error("'project' is required", None))?;
    let project = resolve_project(issues, project_value).await?;
    super::require_permission(
        auth_user,
        project.id,
        Permission::Create,
        "create issues in this project",
    )
    .await?;
    Ok(issues.create(auth_user.user_id, element).await?)
}

async fn resolve_project(
    issues: &IssueService,
    value: &Value,
) -> Result<crate::models::Project, ApiError> {
    if let Some(key) = issue_input::ref_key(value) {
        let pool = Database::pool().await?;
        return Ok(crate::services::project_service::ProjectService::new(pool)
            .by_key(key)
            .await?);
    }
    if let Some(id) = value.get("id").and_then(|v| v.as_str()) {
        if let Ok(id) = uuid::Uuid::parse_str(id) {
            return Ok(issues.project(id).await?);
        }
    }
    Err(ServiceError::validation("'project' must reference a project by key or id").into())
}

/// PUT /api/issue/:key - Edit fields; only fields on the edit screen can be
/// set, absent fields are left alone.
pub async fn edit(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    super::require_permission(&auth_user, issue.project_id, Permission::Edit, "edit this issue")
        .await?;

    let updated = issues.update(&issue, auth_user.user_id, &body).await?;
    Ok(ApiResponse::success(json!({
        "id": updated.id,
        "key": updated.key,
        "self": format!("{}/api/issue/{}", crate::handlers::base_url(), updated.key),
    })))
}

/// DELETE /api/issue/:key - Delete an issue. Issues with sub-tasks need
/// deleteSubtasks=true.
pub async fn delete(
    Path(key): Path<String>,
    Query(query): Query<DeleteQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    super::require_permission(
        &auth_user,
        issue.project_id,
        Permission::Delete,
        "delete this issue",
    )
    .await?;

    let delete_subtasks = query
        .delete_subtasks
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    issues.delete(&issue, delete_subtasks).await?;
    Ok(ApiResponse::<()>::no_content())
}
