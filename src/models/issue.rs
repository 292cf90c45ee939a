use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub key: String,
    pub project_id: Uuid,
    pub issue_type_id: i64,
    pub status_id: i64,
    pub priority_id: Option<i64>,
    pub resolution_id: Option<i64>,
    pub security_level_id: Option<i64>,
    pub summary: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub reporter_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub labels: Vec<String>,
    pub due_date: Option<NaiveDate>,
    /// Custom field values keyed by field id ("customfield_7" etc.)
    pub custom: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn custom_value(&self, field_id: &str) -> Option<&serde_json::Value> {
        self.custom.get(field_id)
    }
}
