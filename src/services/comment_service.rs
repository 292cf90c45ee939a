use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Comment, Issue, User};

use super::ServiceError;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, issue: &Issue) -> Result<Vec<(Comment, Option<User>)>, ServiceError> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE issue_id = $1 ORDER BY created_at",
        )
        .bind(issue.id)
        .fetch_all(&self.pool)
        .await?;

        let mut comments = Vec::with_capacity(rows.len());
        for comment in rows {
            let author = self.author(comment.author_id).await?;
            comments.push((comment, author));
        }
        Ok(comments)
    }

    pub async fn get(&self, issue: &Issue, id: Uuid) -> Result<Comment, ServiceError> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1 AND issue_id = $2")
            .bind(id)
            .bind(issue.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Comment '{}' not found", id)))
    }

    pub async fn add(
        &self,
        issue: &Issue,
        author_id: Uuid,
        body: &str,
    ) -> Result<Comment, ServiceError> {
        if body.trim().is_empty() {
            return Err(ServiceError::validation("Comment body must not be blank"));
        }
        Ok(sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (issue_id, author_id, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(issue.id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Only the comment's author may change it; admins go through the
    /// project permission check in the handler.
    pub async fn update(
        &self,
        comment: &Comment,
        actor_id: Uuid,
        actor_is_admin: bool,
        body: &str,
    ) -> Result<Comment, ServiceError> {
        if comment.author_id != actor_id && !actor_is_admin {
            return Err(ServiceError::forbidden(
                "You do not have permission to edit this comment",
            ));
        }
        if body.trim().is_empty() {
            return Err(ServiceError::validation("Comment body must not be blank"));
        }
        Ok(sqlx::query_as::<_, Comment>(
            "UPDATE comments SET body = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(comment.id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn delete(
        &self,
        comment: &Comment,
        actor_id: Uuid,
        actor_is_admin: bool,
    ) -> Result<(), ServiceError> {
        if comment.author_id != actor_id && !actor_is_admin {
            return Err(ServiceError::forbidden(
                "You do not have permission to delete this comment",
            ));
        }
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn author(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
