use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transition {
    pub id: i64,
    pub name: String,
    /// None means the transition is available from any status.
    pub from_status_id: Option<i64>,
    pub to_status_id: i64,
    /// Screen shown while performing the transition; None means no screen
    /// (and therefore no editable fields).
    pub screen_id: Option<i64>,
}

impl Transition {
    pub fn available_from(&self, status_id: i64) -> bool {
        self.from_status_id.map_or(true, |from| from == status_id)
    }
}
