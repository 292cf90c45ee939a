use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Issue, IssueType, LayoutItem, Project, ScreenTab, Transition};

use super::ServiceError;

/// Supplies the rendered screen layout (tabs of positioned fields) for each
/// operation. The field-metadata assemblers consume this read-only; they do
/// not know where layouts come from.
#[async_trait]
pub trait ScreenService: Send + Sync {
    async fn create_screen_tabs(
        &self,
        project: &Project,
        issue_type: &IssueType,
    ) -> Result<Vec<ScreenTab>, ServiceError>;

    async fn edit_screen_tabs(
        &self,
        project: &Project,
        issue: &Issue,
    ) -> Result<Vec<ScreenTab>, ServiceError>;

    async fn transition_screen_tabs(
        &self,
        transition: &Transition,
    ) -> Result<Vec<ScreenTab>, ServiceError>;
}

pub struct PgScreenService {
    pool: PgPool,
}

impl PgScreenService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn render(&self, screen_id: i64) -> Result<Vec<ScreenTab>, ServiceError> {
        let tabs: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, name FROM screen_tabs WHERE screen_id = $1 ORDER BY position, id",
        )
        .bind(screen_id)
        .fetch_all(&self.pool)
        .await?;

        let mut rendered = Vec::with_capacity(tabs.len());
        for (tab_id, name) in tabs {
            let items: Vec<(String, bool)> = sqlx::query_as(
                "SELECT field_id, required FROM screen_fields WHERE tab_id = $1 ORDER BY position, field_id",
            )
            .bind(tab_id)
            .fetch_all(&self.pool)
            .await?;

            rendered.push(ScreenTab::new(
                name,
                items
                    .into_iter()
                    .map(|(field_id, required)| LayoutItem::new(field_id, required))
                    .collect(),
            ));
        }
        Ok(rendered)
    }
}

#[async_trait]
impl ScreenService for PgScreenService {
    async fn create_screen_tabs(
        &self,
        project: &Project,
        _issue_type: &IssueType,
    ) -> Result<Vec<ScreenTab>, ServiceError> {
        self.render(project.create_screen_id).await
    }

    async fn edit_screen_tabs(
        &self,
        project: &Project,
        _issue: &Issue,
    ) -> Result<Vec<ScreenTab>, ServiceError> {
        self.render(project.edit_screen_id).await
    }

    async fn transition_screen_tabs(
        &self,
        transition: &Transition,
    ) -> Result<Vec<ScreenTab>, ServiceError> {
        match transition.screen_id {
            Some(screen_id) => self.render(screen_id).await,
            // No screen configured: the transition offers no editable fields
            None => Ok(vec![]),
        }
    }
}
