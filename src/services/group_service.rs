use sqlx::PgPool;

use crate::models::{Group, User};

use super::ServiceError;

pub struct GroupService {
    pool: PgPool,
}

impl GroupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn by_name(&self, name: &str) -> Result<Group, ServiceError> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Group '{}' not found", name)))
    }

    pub async fn members(&self, group: &Group) -> Result<Vec<User>, ServiceError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u JOIN group_members m ON m.user_id = u.id
             WHERE m.group_id = $1 ORDER BY u.name",
        )
        .bind(group.id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn create(&self, name: &str) -> Result<Group, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::validation("Group name must not be blank"));
        }
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::conflict(format!("Group '{}' already exists", name)));
        }

        Ok(
            sqlx::query_as::<_, Group>("INSERT INTO groups (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    pub async fn delete(&self, group: &Group) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_member(&self, group: &Group, user: &User) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(group.id)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_member(&self, group: &Group, user: &User) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group.id)
            .bind(user.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found(format!(
                "User '{}' is not a member of group '{}'",
                user.name, group.name
            )));
        }
        Ok(())
    }
}
