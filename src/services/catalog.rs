use sqlx::PgPool;
use uuid::Uuid;

use crate::fields::registry::{CustomKind, CustomOption, FieldDef};
use crate::models::{IssueType, Priority, Resolution, SecurityLevel, Status};

use super::ServiceError;

/// Read access to the shared catalog entities (priorities, statuses,
/// resolutions, issue types, security levels, custom field declarations).
pub struct CatalogService {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CustomFieldRow {
    id: i64,
    name: String,
    kind: String,
    options: Option<serde_json::Value>,
    default_value: Option<serde_json::Value>,
    navigable: bool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn priorities(&self) -> Result<Vec<Priority>, ServiceError> {
        Ok(sqlx::query_as::<_, Priority>(
            "SELECT id, name, sequence, status_color, description FROM priorities ORDER BY sequence",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn priority(&self, id: i64) -> Result<Priority, ServiceError> {
        sqlx::query_as::<_, Priority>(
            "SELECT id, name, sequence, status_color, description FROM priorities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Priority '{}' not found", id)))
    }

    pub async fn statuses(&self) -> Result<Vec<Status>, ServiceError> {
        Ok(sqlx::query_as::<_, Status>(
            "SELECT id, name, category, description FROM statuses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn status(&self, id: i64) -> Result<Status, ServiceError> {
        sqlx::query_as::<_, Status>(
            "SELECT id, name, category, description FROM statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Status '{}' not found", id)))
    }

    pub async fn resolutions(&self) -> Result<Vec<Resolution>, ServiceError> {
        Ok(sqlx::query_as::<_, Resolution>(
            "SELECT id, name, description FROM resolutions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn resolution(&self, id: i64) -> Result<Resolution, ServiceError> {
        sqlx::query_as::<_, Resolution>(
            "SELECT id, name, description FROM resolutions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Resolution '{}' not found", id)))
    }

    pub async fn issue_types(&self) -> Result<Vec<IssueType>, ServiceError> {
        Ok(sqlx::query_as::<_, IssueType>(
            "SELECT id, name, subtask, description FROM issue_types ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn issue_type(&self, id: i64) -> Result<IssueType, ServiceError> {
        sqlx::query_as::<_, IssueType>(
            "SELECT id, name, subtask, description FROM issue_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Issue type '{}' not found", id)))
    }

    pub async fn security_levels(&self, project_id: Uuid) -> Result<Vec<SecurityLevel>, ServiceError> {
        Ok(sqlx::query_as::<_, SecurityLevel>(
            "SELECT id, project_id, name, description FROM security_levels WHERE project_id = $1 ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Declared custom fields as field definitions, ready for the catalog.
    pub async fn custom_fields(&self) -> Result<Vec<FieldDef>, ServiceError> {
        let rows: Vec<CustomFieldRow> = sqlx::query_as(
            "SELECT id, name, kind, options, default_value, navigable FROM custom_fields ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut defs = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(kind) = CustomKind::parse(&row.kind) else {
                tracing::warn!("skipping custom field {} with unknown kind '{}'", row.id, row.kind);
                continue;
            };
            let options = match row.options {
                Some(value) => serde_json::from_value::<Vec<CustomOption>>(value).ok(),
                None => None,
            };
            defs.push(FieldDef::custom(
                row.id,
                &row.name,
                kind,
                row.navigable,
                options,
                row.default_value,
            ));
        }
        Ok(defs)
    }
}
