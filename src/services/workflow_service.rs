use std::collections::HashMap;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::fields::FieldCatalog;
use crate::models::{Issue, Transition};

use super::catalog::CatalogService;
use super::issue_input::FieldInputs;
use super::issue_service::IssueService;
use super::screens::{PgScreenService, ScreenService};
use super::ServiceError;

pub struct WorkflowService {
    pool: PgPool,
    catalog: CatalogService,
    screens: PgScreenService,
    issues: IssueService,
}

impl WorkflowService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogService::new(pool.clone()),
            screens: PgScreenService::new(pool.clone()),
            issues: IssueService::new(pool.clone()),
            pool,
        }
    }

    /// Transitions available from the issue's current status, in workflow
    /// order.
    pub async fn available_transitions(&self, issue: &Issue) -> Result<Vec<Transition>, ServiceError> {
        Ok(sqlx::query_as::<_, Transition>(
            "SELECT * FROM transitions WHERE from_status_id IS NULL OR from_status_id = $1 ORDER BY id",
        )
        .bind(issue.status_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn transition(&self, id: i64) -> Result<Transition, ServiceError> {
        sqlx::query_as::<_, Transition>("SELECT * FROM transitions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Transition '{}' not found", id)))
    }

    /// Performs a transition, applying any fields the transition screen
    /// permits. A screen that shows `resolution` demands one, whatever the
    /// screen's own required flag says.
    pub async fn perform(
        &self,
        issue: &Issue,
        actor_id: Uuid,
        transition_id: i64,
        body: &Value,
    ) -> Result<Issue, ServiceError> {
        let transition = self.transition(transition_id).await?;
        if !transition.available_from(issue.status_id) {
            return Err(ServiceError::validation(format!(
                "Transition '{}' is not available from the issue's current status",
                transition.name
            )));
        }

        let inputs = FieldInputs::parse(body)?;
        let tabs = self.screens.transition_screen_tabs(&transition).await?;
        inputs.validate_against_screen(&tabs, &[])?;

        let screen_has_resolution = tabs
            .iter()
            .flat_map(|tab| tab.items.iter())
            .any(|item| item.field_id == "resolution");
        if screen_has_resolution && !inputs.contains("resolution") {
            let mut field_errors = HashMap::new();
            field_errors.insert(
                "resolution".to_string(),
                "Field 'resolution' is required.".to_string(),
            );
            return Err(ServiceError::field_validation(
                "Missing required fields",
                field_errors,
            ));
        }

        let project = self.issues.project(issue.project_id).await?;
        let catalog = FieldCatalog::new(self.catalog.custom_fields().await?);
        let parsed = self.issues.parse_field_values(&inputs, &catalog, &project).await?;

        let mut updated = issue.clone();
        updated.status_id = transition.to_status_id;
        if inputs.contains("resolution") {
            updated.resolution_id = parsed.resolution_id;
        }
        if inputs.contains("assignee") {
            updated.assignee_id = parsed.assignee_id;
        }
        if inputs.contains("priority") {
            updated.priority_id = parsed.priority_id;
        }
        if let Some(summary) = parsed.summary {
            updated.summary = summary;
        }

        // Leaving a done status clears the resolution unless the caller set
        // one during this transition.
        let target = self.catalog.status(transition.to_status_id).await?;
        if target.category != "done" && !inputs.contains("resolution") {
            updated.resolution_id = None;
        }

        let stored = self.issues.store_issue(&updated).await?;

        for body in &inputs.comment_additions {
            self.add_comment_row(stored.id, actor_id, body).await?;
        }

        tracing::info!(
            "issue {} transitioned via '{}' to status {}",
            stored.key,
            transition.name,
            stored.status_id
        );
        Ok(stored)
    }

    async fn add_comment_row(
        &self,
        issue_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<(), ServiceError> {
        sqlx::query("INSERT INTO comments (issue_id, author_id, body) VALUES ($1, $2, $3)")
            .bind(issue_id)
            .bind(author_id)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
