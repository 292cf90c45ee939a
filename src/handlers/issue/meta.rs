use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::db::Database;
use crate::error::ApiError;
use crate::fields::allowed::AllowedValuesContext;
use crate::fields::defaults::DefaultFieldMetaHelper;
use crate::fields::meta::{CreateMetaAssembler, EditMetaAssembler, MetaContext};
use crate::fields::{FieldCatalog, IncludedFields, MetaFieldAssembler};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::Project;
use crate::services::catalog::CatalogService;
use crate::services::permission::{Permission, PermissionService, PgPermissionService};
use crate::services::screens::PgScreenService;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct CreateMetaQuery {
    #[serde(rename = "projectIds")]
    pub project_ids: Option<String>,
    #[serde(rename = "projectKeys")]
    pub project_keys: Option<String>,
    #[serde(rename = "issuetypeIds")]
    pub issuetype_ids: Option<String>,
    #[serde(rename = "issuetypeNames")]
    pub issuetype_names: Option<String>,
    pub expand: Option<String>,
    pub fields: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditMetaQuery {
    pub fields: Option<String>,
}

/// Assembles the per-request context the metadata builders share.
pub(crate) async fn build_meta_context(
    project: Project,
    with_defaults: bool,
) -> Result<MetaContext, ApiError> {
    let pool = Database::pool().await?;
    let catalog_svc = CatalogService::new(pool);

    let allowed = AllowedValuesContext {
        priorities: catalog_svc.priorities().await?,
        resolutions: catalog_svc.resolutions().await?,
        issue_types: catalog_svc
            .issue_types()
            .await?
            .into_iter()
            .filter(|t| !t.subtask)
            .collect(),
        security_levels: catalog_svc.security_levels(project.id).await?,
    };
    let catalog = FieldCatalog::new(catalog_svc.custom_fields().await?);
    let default_helper = with_defaults.then(|| DefaultFieldMetaHelper::new(project.clone()));

    Ok(MetaContext {
        catalog,
        allowed,
        project,
        default_helper,
        base_url: crate::handlers::base_url().to_string(),
    })
}

fn split_csv(param: &Option<String>) -> Vec<String> {
    param
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// GET /api/issue/createmeta - Projects and issue types the caller can
/// create issues in, with per-field metadata when
/// expand=projects.issuetypes.fields is given. Projects without the Create
/// permission are simply absent.
pub async fn createmeta(
    Query(query): Query<CreateMetaQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let pool = Database::pool().await?;
    let catalog_svc = CatalogService::new(pool.clone());
    let permissions: Arc<dyn PermissionService> = Arc::new(PgPermissionService::new(pool.clone()));
    let screens = Arc::new(PgScreenService::new(pool.clone()));

    let with_fields = query
        .expand
        .as_deref()
        .map_or(false, |e| e.contains("projects.issuetypes.fields"));
    let field_params: Vec<String> = query.fields.clone().into_iter().collect();
    let include = IncludedFields::include_all_by_default(&field_params);

    let project_ids = split_csv(&query.project_ids);
    let project_keys: Vec<String> = split_csv(&query.project_keys)
        .into_iter()
        .map(|k| k.to_uppercase())
        .collect();
    let type_ids = split_csv(&query.issuetype_ids);
    let type_names = split_csv(&query.issuetype_names);

    let all_projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY key")
        .fetch_all(&pool)
        .await
        .map_err(crate::services::ServiceError::from)?;

    let issue_types = catalog_svc.issue_types().await?;

    let mut rendered_projects = Vec::new();
    for project in all_projects {
        // Filters are narrowing; naming an unknown project is not an error
        let wanted = (project_ids.is_empty() && project_keys.is_empty())
            || project_ids.contains(&project.id.to_string())
            || project_keys.contains(&project.key);
        if !wanted {
            continue;
        }
        if !permissions
            .has_permission(auth_user.user_id, project.id, Permission::Create)
            .await?
        {
            continue;
        }

        let mut rendered_types = Vec::new();
        for issue_type in &issue_types {
            let wanted = (type_ids.is_empty() && type_names.is_empty())
                || type_ids.contains(&issue_type.id.to_string())
                || type_names.iter().any(|n| n.eq_ignore_ascii_case(&issue_type.name));
            if !wanted {
                continue;
            }

            let mut type_view = views::issue_type_ref(issue_type, crate::handlers::base_url());
            if with_fields {
                let ctx = build_meta_context(project.clone(), true).await?;
                let assembler = CreateMetaAssembler::new(
                    ctx,
                    issue_type.clone(),
                    auth_user.user_id,
                    permissions.clone(),
                    screens.clone(),
                );
                let fields = assembler.build(&include).await?;
                type_view["fields"] = fields_to_value(fields)?;
            }
            rendered_types.push(type_view);
        }

        let mut project_view = views::project_ref(&project, crate::handlers::base_url());
        project_view["issuetypes"] = Value::Array(rendered_types);
        rendered_projects.push(project_view);
    }

    Ok(ApiResponse::success(json!({
        "expand": "projects",
        "projects": rendered_projects,
    })))
}

/// GET /api/issue/:key/editmeta - Field metadata for the edit screen.
/// A caller without edit permission gets an empty fields map, not an error.
pub async fn editmeta(
    Path(key): Path<String>,
    Query(query): Query<EditMetaQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let (issue, issues) = super::browseable_issue(&key, &auth_user).await?;
    let project = issues.project(issue.project_id).await?;

    let pool = Database::pool().await?;
    let permissions: Arc<dyn PermissionService> = Arc::new(PgPermissionService::new(pool.clone()));
    let screens = Arc::new(PgScreenService::new(pool));

    let field_params: Vec<String> = query.fields.into_iter().collect();
    let include = IncludedFields::include_all_by_default(&field_params);

    let ctx = build_meta_context(project, true).await?;
    let assembler =
        EditMetaAssembler::new(ctx, issue, auth_user.user_id, permissions, screens);
    let fields = assembler.build(&include).await?;

    Ok(ApiResponse::success(json!({ "fields": fields_to_value(fields)? })))
}

pub(crate) fn fields_to_value(
    fields: std::collections::BTreeMap<String, crate::fields::FieldMeta>,
) -> Result<Value, ApiError> {
    let mut map = Map::new();
    for (id, meta) in fields {
        let value = serde_json::to_value(meta)
            .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
        map.insert(id, value);
    }
    Ok(Value::Object(map))
}
