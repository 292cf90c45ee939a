use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Project, User};

use super::permission::{Permission, PermissionService, PgPermissionService};
use super::ServiceError;

pub struct ProjectService {
    pool: PgPool,
    permissions: PgPermissionService,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            permissions: PgPermissionService::new(pool.clone()),
            pool,
        }
    }

    pub async fn by_key(&self, key: &str) -> Result<Project, ServiceError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE upper(key) = upper($1)")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Project '{}' not found", key)))
    }

    /// Projects the user may browse. Projects the user has no role in are
    /// silently absent, not an error.
    pub async fn browseable(&self, user_id: Uuid) -> Result<Vec<Project>, ServiceError> {
        let projects =
            sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        let mut visible = Vec::with_capacity(projects.len());
        for project in projects {
            if self
                .permissions
                .has_permission(user_id, project.id, Permission::Browse)
                .await?
            {
                visible.push(project);
            }
        }
        Ok(visible)
    }

    pub async fn lead(&self, project: &Project) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(project.lead_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project lead not found".to_string()))
    }

    /// Creates a project with the default screens and grants the lead the
    /// admin role. Used by the admin CLI.
    pub async fn create(
        &self,
        key: &str,
        name: &str,
        lead: &User,
    ) -> Result<Project, ServiceError> {
        let key = key.to_uppercase();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ServiceError::validation(
                "Project key must be alphanumeric",
            ));
        }
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM projects WHERE key = $1")
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::conflict(format!(
                "Project '{}' already exists",
                key
            )));
        }

        let (screen_id,): (i64,) =
            sqlx::query_as("SELECT id FROM screens ORDER BY id LIMIT 1")
                .fetch_one(&self.pool)
                .await?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (key, name, lead_id, create_screen_id, edit_screen_id)
             VALUES ($1, $2, $3, $4, $4) RETURNING *",
        )
        .bind(&key)
        .bind(name)
        .bind(lead.id)
        .bind(screen_id)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO project_roles (project_id, user_id, role) VALUES ($1, $2, 'admin')",
        )
        .bind(project.id)
        .bind(lead.id)
        .execute(&self.pool)
        .await?;

        tracing::info!("created project {}", project.key);
        Ok(project)
    }

    pub async fn grant_role(
        &self,
        project: &Project,
        user: &User,
        role: &str,
    ) -> Result<(), ServiceError> {
        if !matches!(role, "admin" | "member" | "viewer") {
            return Err(ServiceError::validation(format!("Unknown role '{}'", role)));
        }
        sqlx::query(
            "INSERT INTO project_roles (project_id, user_id, role) VALUES ($1, $2, $3)
             ON CONFLICT (project_id, user_id) DO UPDATE SET role = EXCLUDED.role",
        )
        .bind(project.id)
        .bind(user.id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
