use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::db::Database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::group_service::GroupService;
use crate::services::user_service::UserService;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    pub groupname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MembershipBody {
    pub groupname: String,
    pub username: String,
}

fn required_groupname(query: GroupQuery) -> Result<String, ApiError> {
    query
        .groupname
        .ok_or_else(|| ApiError::bad_request("The 'groupname' query parameter is required"))
}

/// GET /api/group?groupname= - A group with its members
pub async fn get(Query(query): Query<GroupQuery>) -> ApiResult<Value> {
    let name = required_groupname(query)?;
    let pool = Database::pool().await?;
    let groups = GroupService::new(pool);

    let group = groups.by_name(&name).await?;
    let members = groups.members(&group).await?;
    Ok(ApiResponse::success(views::group_view(
        &group,
        &members,
        super::base_url(),
    )))
}

/// POST /api/group - Create a group
pub async fn create(Json(body): Json<GroupBody>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let groups = GroupService::new(pool);

    let group = groups.create(&body.name).await?;
    Ok(ApiResponse::created(views::group_view(
        &group,
        &[],
        super::base_url(),
    )))
}

/// DELETE /api/group?groupname= - Delete a group
pub async fn delete(Query(query): Query<GroupQuery>) -> ApiResult<()> {
    let name = required_groupname(query)?;
    let pool = Database::pool().await?;
    let groups = GroupService::new(pool);

    let group = groups.by_name(&name).await?;
    groups.delete(&group).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/group/user - Add a user to a group
pub async fn add_user(Json(body): Json<MembershipBody>) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let groups = GroupService::new(pool.clone());
    let users = UserService::new(pool);

    let group = groups.by_name(&body.groupname).await?;
    let user = users.by_name(&body.username).await?;
    groups.add_member(&group, &user).await?;

    let members = groups.members(&group).await?;
    Ok(ApiResponse::created(views::group_view(
        &group,
        &members,
        super::base_url(),
    )))
}

/// DELETE /api/group/user - Remove a user from a group
pub async fn remove_user(Json(body): Json<MembershipBody>) -> ApiResult<()> {
    let pool = Database::pool().await?;
    let groups = GroupService::new(pool.clone());
    let users = UserService::new(pool);

    let group = groups.by_name(&body.groupname).await?;
    let user = users.by_name(&body.username).await?;
    groups.remove_member(&group, &user).await?;
    Ok(ApiResponse::<()>::no_content())
}
