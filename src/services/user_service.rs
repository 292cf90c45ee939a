use sqlx::PgPool;

use crate::auth;
use crate::models::User;

use super::ServiceError;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn by_name(&self, name: &str) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User '{}' not found", name)))
    }

    /// Case-insensitive substring search over username and display name,
    /// active users only. Powers field auto-complete.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, ServiceError> {
        let pattern = format!("%{}%", query);
        Ok(sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE active AND (name ILIKE $1 OR display_name ILIKE $1)
             ORDER BY name LIMIT $2",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn authenticate(&self, name: &str, password: &str) -> Result<User, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1 AND active")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) if auth::verify_password(password, &user.password_hash) => Ok(user),
            // Same answer whether the user is missing or the password wrong
            _ => Err(ServiceError::forbidden("Invalid username or password")),
        }
    }

    pub async fn create(
        &self,
        name: &str,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::validation("Username must not be blank"));
        }
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::conflict(format!("User '{}' already exists", name)));
        }

        Ok(sqlx::query_as::<_, User>(
            "INSERT INTO users (name, display_name, email, password_hash)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(name)
        .bind(display_name)
        .bind(email)
        .bind(auth::hash_password(password))
        .fetch_one(&self.pool)
        .await?)
    }
}
