use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub description: String,
    pub lead_id: Uuid,
    /// 'lead' or 'unassigned'
    pub default_assignee: String,
    pub default_priority_id: Option<i64>,
    pub default_security_level_id: Option<i64>,
    pub create_screen_id: i64,
    pub edit_screen_id: i64,
    pub counter: i64,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn assigns_to_lead_by_default(&self) -> bool {
        self.default_assignee == "lead"
    }
}
