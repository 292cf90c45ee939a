use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::Database;
use crate::error::ApiError;
use crate::fields::meta::TransitionMetaAssembler;
use crate::fields::{IncludedFields, MetaFieldAssembler};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::catalog::CatalogService;
use crate::services::permission::{Permission, PermissionService, PgPermissionService};
use crate::services::screens::PgScreenService;
use crate::services::workflow_service::WorkflowService;
use crate::views;

use super::meta::{build_meta_context, fields_to_value};

#[derive(Debug, Deserialize)]
pub struct TransitionsQuery {
    #[serde(rename = "transitionId")]
    pub transition_id: Option<String>,
    pub expand: Option<String>,
    pub fields: Option<String>,
}

/// GET /api/issue/:key/transitions - Transitions available to the caller,
/// with per-transition field metadata when expand=transitions.fields.
pub async fn list(
    Path(key): Path<String>,
    Query(query): Query<TransitionsQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;

    let filter_id = match query.transition_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(raw.parse::<i64>().map_err(|_| {
            ApiError::bad_request("The 'transitionId' query parameter must be an integer")
        })?),
        _ => None,
    };

    let pool = Database::pool().await?;
    let workflow = WorkflowService::new(pool.clone());
    let catalog = CatalogService::new(pool.clone());
    let permissions: Arc<dyn PermissionService> = Arc::new(PgPermissionService::new(pool.clone()));
    let screens = Arc::new(PgScreenService::new(pool));

    let with_fields = query
        .expand
        .as_deref()
        .map_or(false, |e| e.contains("transitions.fields"));
    let field_params: Vec<String> = query.fields.into_iter().collect();
    let include = IncludedFields::include_all_by_default(&field_params);

    let project = issues.project(issue.project_id).await?;

    let mut rendered = Vec::new();
    for transition in workflow.available_transitions(&issue).await? {
        if filter_id.map_or(false, |id| id != transition.id) {
            continue;
        }

        let to_status = catalog.status(transition.to_status_id).await?;
        let mut view = json!({
            "id": transition.id.to_string(),
            "name": transition.name,
            "to": views::status_view(&to_status, crate::handlers::base_url()),
        });

        if with_fields {
            let ctx = build_meta_context(project.clone(), false).await?;
            let assembler = TransitionMetaAssembler::new(
                ctx,
                transition,
                auth_user.user_id,
                permissions.clone(),
                screens.clone(),
            );
            view["fields"] = fields_to_value(assembler.build(&include).await?)?;
        }
        rendered.push(view);
    }

    Ok(ApiResponse::success(json!({
        "expand": "transitions",
        "transitions": rendered,
    })))
}

/// POST /api/issue/:key/transitions - Perform a transition, optionally
/// setting fields the transition screen allows.
pub async fn perform(
    Path(key): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<()> {
    let (issue, _issues) = super::browseable_issue(&key, &auth_user).await?;

    let transition_value = body
        .get("transition")
        .ok_or_else(|| ApiError::bad_request("No transition specified"))?;
    let transition_id = match transition_value.get("id") {
        Some(Value::String(raw)) => raw
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request("The transition id must be an integer")),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ApiError::bad_request("The transition id must be an integer")),
        _ => Err(ApiError::bad_request("No transition specified")),
    }?;

    super::require_permission(
        &auth_user,
        issue.project_id,
        Permission::Transition,
        "transition this issue",
    )
    .await?;

    let pool = Database::pool().await?;
    let workflow = WorkflowService::new(pool);
    workflow
        .perform(&issue, auth_user.user_id, transition_id, &body)
        .await?;

    Ok(ApiResponse::<()>::no_content())
}
