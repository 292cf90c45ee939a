use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub author_id: Uuid,
    #[serde(skip_serializing)]
    pub disk_path: String,
    pub created_at: DateTime<Utc>,
}
