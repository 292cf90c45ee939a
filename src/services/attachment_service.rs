use std::path::{Path, PathBuf};

use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::models::{Attachment, Issue, User};

use super::ServiceError;

pub struct AttachmentService {
    pool: PgPool,
}

impl AttachmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores the uploaded bytes on disk and records the row. Content lives
    /// under the configured attachment directory keyed by attachment id, so
    /// duplicate filenames never collide.
    pub async fn save(
        &self,
        issue: &Issue,
        author_id: Uuid,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<Attachment, ServiceError> {
        let cfg = &config::config().attachments;
        if bytes.len() > cfg.max_size_bytes {
            return Err(ServiceError::validation(format!(
                "Attachment exceeds the maximum size of {} bytes",
                cfg.max_size_bytes
            )));
        }
        let filename = sanitize_filename(filename);
        if filename.is_empty() {
            return Err(ServiceError::validation("Attachment filename is required"));
        }

        let id = Uuid::new_v4();
        let dir = PathBuf::from(&cfg.dir);
        tokio::fs::create_dir_all(&dir).await?;
        let disk_path = dir.join(id.to_string());
        tokio::fs::write(&disk_path, bytes).await?;

        let attachment = sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments (id, issue_id, filename, mime_type, size, author_id, disk_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(id)
        .bind(issue.id)
        .bind(&filename)
        .bind(mime_type)
        .bind(bytes.len() as i64)
        .bind(author_id)
        .bind(disk_path.to_string_lossy().as_ref())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("stored attachment {} on issue {}", filename, issue.key);
        Ok(attachment)
    }

    pub async fn get(&self, id: Uuid) -> Result<Attachment, ServiceError> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Attachment '{}' not found", id)))
    }

    pub async fn content(&self, attachment: &Attachment) -> Result<Vec<u8>, ServiceError> {
        Ok(tokio::fs::read(&attachment.disk_path).await?)
    }

    pub async fn delete(&self, attachment: &Attachment) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(attachment.id)
            .execute(&self.pool)
            .await?;
        // Best effort: a missing file is not an error once the row is gone
        if let Err(e) = tokio::fs::remove_file(&attachment.disk_path).await {
            tracing::warn!("could not remove attachment file {}: {}", attachment.disk_path, e);
        }
        Ok(())
    }

    pub async fn author(&self, attachment: &Attachment) -> Result<Option<User>, ServiceError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(attachment.author_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

/// Strips path components so uploads cannot escape the attachment directory
/// listing.
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_lose_their_directories() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir/inner/name.txt"), "name.txt");
        assert_eq!(sanitize_filename(""), "");
    }
}
