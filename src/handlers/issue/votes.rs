use axum::extract::{Extension, Path};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::views;

/// GET /api/issue/:key/votes - Vote count, the caller's vote state, and the
/// voters.
pub async fn get(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;

    let (count, has_voted) = issues.vote_state(&issue, auth_user.user_id).await?;
    let voters = issues.voters(&issue).await?;

    Ok(ApiResponse::success(json!({
        "self": format!("{}/api/issue/{}/votes", crate::handlers::base_url(), issue.key),
        "votes": count,
        "hasVoted": has_voted,
        "voters": voters
            .iter()
            .map(|u| views::user_ref(u, crate::handlers::base_url()))
            .collect::<Vec<_>>(),
    })))
}

/// POST /api/issue/:key/votes - Cast the caller's vote
pub async fn add(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    issues.add_vote(&issue, auth_user.user_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// DELETE /api/issue/:key/votes - Withdraw the caller's vote
pub async fn remove(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    issues.remove_vote(&issue, auth_user.user_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
