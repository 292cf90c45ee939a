use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Browse,
    Create,
    Edit,
    Transition,
    Assign,
    Comment,
    Attach,
    Delete,
    Administer,
}

/// Project-scoped permission checks. The metadata assemblers and handlers
/// consume this as an injected interface; production queries project roles,
/// tests substitute fixed answers.
#[async_trait]
pub trait PermissionService: Send + Sync {
    async fn has_permission(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        permission: Permission,
    ) -> Result<bool, ServiceError>;
}

pub struct PgPermissionService {
    pool: PgPool,
}

impl PgPermissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn role_grants(role: &str, permission: Permission) -> bool {
        match role {
            "admin" => true,
            "member" => !matches!(permission, Permission::Delete | Permission::Administer),
            "viewer" => matches!(permission, Permission::Browse),
            _ => false,
        }
    }
}

#[async_trait]
impl PermissionService for PgPermissionService {
    async fn has_permission(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        permission: Permission,
    ) -> Result<bool, ServiceError> {
        let role: Option<(String,)> = sqlx::query_as(
            "SELECT role FROM project_roles WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.map_or(false, |(role,)| Self::role_grants(&role, permission)))
    }
}
