use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Priority {
    pub id: i64,
    pub name: String,
    pub sequence: i32,
    pub status_color: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Status {
    pub id: i64,
    pub name: String,
    /// One of 'new', 'indeterminate', 'done'
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resolution {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IssueType {
    pub id: i64,
    pub name: String,
    pub subtask: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityLevel {
    pub id: i64,
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
}
