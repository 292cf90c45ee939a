pub mod assignee;
pub mod attachment;
pub mod comment;
pub mod crud;
pub mod meta;
pub mod transitions;
pub mod votes;
pub mod watchers;

use uuid::Uuid;

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::Issue;
use crate::services::issue_service::IssueService;
use crate::services::permission::{Permission, PermissionService, PgPermissionService};

/// Loads an issue the caller may browse. A missing issue and an issue the
/// caller cannot see produce the same 404.
pub(crate) async fn browseable_issue(
    key_or_id: &str,
    auth_user: &AuthUser,
) -> Result<(Issue, IssueService), ApiError> {
    let pool = Database::pool().await?;
    let issues = IssueService::new(pool.clone());
    let permissions = PgPermissionService::new(pool);

    let issue = issues.get(key_or_id).await.map_err(|e| match e {
        crate::services::ServiceError::NotFound(_) => not_found(key_or_id),
        other => other.into(),
    })?;
    if !permissions
        .has_permission(auth_user.user_id, issue.project_id, Permission::Browse)
        .await?
    {
        return Err(not_found(key_or_id));
    }
    Ok((issue, issues))
}

pub(crate) fn not_found(key: &str) -> ApiError {
    ApiError::not_found(format!(
        "Issue '{}' does not exist or you do not have permission to see it",
        key
    ))
}

/// 403 unless the caller holds the permission on the issue's project.
pub(crate) async fn require_permission(
    auth_user: &AuthUser,
    project_id: Uuid,
    permission: Permission,
    action: &str,
) -> Result<(), ApiError> {
    let pool = Database::pool().await?;
    let permissions = PgPermissionService::new(pool);
    if !permissions
        .has_permission(auth_user.user_id, project_id, permission)
        .await?
    {
        return Err(ApiError::forbidden(format!(
            "You do not have permission to {}",
            action
        )));
    }
    Ok(())
}
