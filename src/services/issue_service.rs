use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::fields::registry::{CustomKind, FieldDef, FieldKind};
use crate::fields::FieldCatalog;
use crate::models::{Issue, IssueType, Project, Status, User};
use crate::views::issue::IssueViewData;

use super::catalog::CatalogService;
use super::issue_input::{self, FieldInputs};
use super::screens::{PgScreenService, ScreenService};
use super::ServiceError;

pub struct IssueService {
    pool: PgPool,
    catalog: CatalogService,
    screens: PgScreenService,
}

impl IssueService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogService::new(pool.clone()),
            screens: PgScreenService::new(pool.clone()),
            pool,
        }
    }

    /// Looks up an issue by key (case-insensitive) or by id.
    pub async fn get(&self, key_or_id: &str) -> Result<Issue, ServiceError> {
        if let Ok(id) = Uuid::parse_str(key_or_id) {
            if let Some(issue) = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            {
                return Ok(issue);
            }
        }

        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE upper(key) = upper($1)")
            .bind(key_or_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Issue '{}' not found", key_or_id)))
    }

    pub async fn project(&self, id: Uuid) -> Result<Project, ServiceError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project not found".to_string()))
    }

    async fn resolve_project(&self, value: &Value) -> Result<Project, ServiceError> {
        if let Some(key) = issue_input::ref_key(value) {
            return sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE upper(key) = upper($1)")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("Project '{}' not found", key)));
        }
        if let Some(id) = value.get("id").and_then(|v| v.as_str()) {
            if let Ok(id) = Uuid::parse_str(id) {
                return self.project(id).await;
            }
        }
        Err(ServiceError::validation(
            "'project' must reference a project by key or id",
        ))
    }

    async fn resolve_issue_type(&self, value: &Value) -> Result<IssueType, ServiceError> {
        if let Some(id) = issue_input::ref_id(value) {
            return self.catalog.issue_type(id).await;
        }
        if let Some(name) = issue_input::ref_name(value) {
            let types = self.catalog.issue_types().await?;
            return types
                .into_iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| ServiceError::not_found(format!("Issue type '{}' not found", name)));
        }
        Err(ServiceError::validation(
            "'issuetype' must reference an issue type by id or name",
        ))
    }

    async fn initial_status(&self) -> Result<Status, ServiceError> {
        sqlx::query_as::<_, Status>(
            "SELECT id, name, category, description FROM statuses
             ORDER BY CASE WHEN category = 'new' THEN 0 ELSE 1 END, id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::validation("No statuses configured"))
    }

    async fn next_key(&self, project: &Project) -> Result<String, ServiceError> {
        let (counter,): (i64,) =
            sqlx::query_as("UPDATE projects SET counter = counter + 1 WHERE id = $1 RETURNING counter")
                .bind(project.id)
                .fetch_one(&self.pool)
                .await?;
        Ok(format!("{}-{}", project.key, counter))
    }

    pub async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn assignable_user(&self, name: &str) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1 AND active")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::validation(format!("User '{}' cannot be assigned", name)))
    }

    /// Creates an issue from a request body. The project and issue type come
    /// from the body; every other field must sit on the project's create
    /// screen.
    pub async fn create(&self, reporter_id: Uuid, body: &Value) -> Result<Issue, ServiceError> {
        let inputs = FieldInputs::parse(body)?;

        let project_value = inputs
            .get("project")
            .ok_or_else(|| ServiceError::validation("'project' is required"))?;
        let project = self.resolve_project(project_value).await?;

        let type_value = inputs
            .get("issuetype")
            .ok_or_else(|| ServiceError::validation("'issuetype' is required"))?;
        let issue_type = self.resolve_issue_type(type_value).await?;

        let parent = match (issue_type.subtask, inputs.get("parent")) {
            (true, None) => {
                return Err(ServiceError::validation(
                    "'parent' is required when creating a sub-task",
                ))
            }
            (true, Some(value)) => {
                let key = issue_input::ref_key(value)
                    .or_else(|| value.get("id").and_then(|v| v.as_str()))
                    .ok_or_else(|| {
                        ServiceError::validation("'parent' must reference an issue by key or id")
                    })?;
                let parent = self.get(key).await?;
                if parent.project_id != project.id {
                    return Err(ServiceError::validation(
                        "Parent issue must belong to the same project",
                    ));
                }
                if parent.is_subtask() {
                    return Err(ServiceError::validation(
                        "A sub-task cannot have another sub-task as its parent",
                    ));
                }
                Some(parent)
            }
            (false, Some(_)) => {
                return Err(ServiceError::validation(
                    "'parent' can only be set for sub-task issue types",
                ))
            }
            (false, None) => None,
        };

        let tabs = self.screens.create_screen_tabs(&project, &issue_type).await?;
        inputs.validate_against_screen(&tabs, &["project", "issuetype", "parent"])?;
        inputs.validate_required(&tabs)?;

        let catalog = FieldCatalog::new(self.catalog.custom_fields().await?);
        let parsed = self.parse_field_values(&inputs, &catalog, &project).await?;

        let summary = parsed
            .summary
            .ok_or_else(|| ServiceError::validation("'summary' is required"))?;

        // Project configuration fills gaps the caller left
        let priority_id = parsed.priority_id.or(project.default_priority_id);
        let assignee_id = match parsed.assignee_id {
            Some(id) => Some(id),
            None if project.assigns_to_lead_by_default() => Some(project.lead_id),
            None => None,
        };

        let key = self.next_key(&project).await?;
        let status = self.initial_status().await?;
        let labels = parsed.labels.unwrap_or_default();
        let custom = Value::Object(parsed.custom);

        let issue = sqlx::query_as::<_, Issue>(
            "INSERT INTO issues
                (key, project_id, issue_type_id, status_id, priority_id, security_level_id,
                 summary, description, assignee_id, reporter_id, parent_id, labels, due_date, custom)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *",
        )
        .bind(&key)
        .bind(project.id)
        .bind(issue_type.id)
        .bind(status.id)
        .bind(priority_id)
        .bind(parsed.security_level_id)
        .bind(&summary)
        .bind(&parsed.description)
        .bind(assignee_id)
        .bind(reporter_id)
        .bind(parent.as_ref().map(|p| p.id))
        .bind(&labels)
        .bind(parsed.due_date)
        .bind(&custom)
        .fetch_one(&self.pool)
        .await?;

        for body in &inputs.comment_additions {
            self.add_comment_row(issue.id, reporter_id, body).await?;
        }

        tracing::info!("created issue {}", issue.key);
        Ok(issue)
    }

    /// Applies an edit request: fields must sit on the edit screen, absent
    /// fields stay unchanged, comment additions ride in the update section.
    pub async fn update(
        &self,
        issue: &Issue,
        actor_id: Uuid,
        body: &Value,
    ) -> Result<Issue, ServiceError> {
        let inputs = FieldInputs::parse(body)?;
        if inputs.is_empty() {
            return Err(ServiceError::validation("No fields or updates provided"));
        }

        let project = self.project(issue.project_id).await?;
        let tabs = self.screens.edit_screen_tabs(&project, issue).await?;
        inputs.validate_against_screen(&tabs, &[])?;

        let catalog = FieldCatalog::new(self.catalog.custom_fields().await?);
        let parsed = self.parse_field_values(&inputs, &catalog, &project).await?;

        let mut updated = issue.clone();
        if let Some(summary) = parsed.summary {
            updated.summary = summary;
        }
        if inputs.contains("description") {
            updated.description = parsed.description;
        }
        if inputs.contains("priority") {
            updated.priority_id = parsed.priority_id;
        }
        if inputs.contains("resolution") {
            updated.resolution_id = parsed.resolution_id;
        }
        if inputs.contains("security") {
            updated.security_level_id = parsed.security_level_id;
        }
        if inputs.contains("assignee") {
            updated.assignee_id = parsed.assignee_id;
        }
        if let Some(labels) = parsed.labels {
            updated.labels = labels;
        }
        if inputs.contains("duedate") {
            updated.due_date = parsed.due_date;
        }
        if let Value::Object(existing) = &mut updated.custom {
            for (k, v) in parsed.custom {
                existing.insert(k, v);
            }
        }

        let issue = self.store_issue(&updated).await?;

        for body in &inputs.comment_additions {
            self.add_comment_row(issue.id, actor_id, body).await?;
        }

        Ok(issue)
    }

    pub(crate) async fn store_issue(&self, issue: &Issue) -> Result<Issue, ServiceError> {
        Ok(sqlx::query_as::<_, Issue>(
            "UPDATE issues SET
                status_id = $2, priority_id = $3, resolution_id = $4, security_level_id = $5,
                summary = $6, description = $7, assignee_id = $8, labels = $9, due_date = $10,
                custom = $11, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(issue.id)
        .bind(issue.status_id)
        .bind(issue.priority_id)
        .bind(issue.resolution_id)
        .bind(issue.security_level_id)
        .bind(&issue.summary)
        .bind(&issue.description)
        .bind(issue.assignee_id)
        .bind(&issue.labels)
        .bind(issue.due_date)
        .bind(&issue.custom)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn delete(&self, issue: &Issue, delete_subtasks: bool) -> Result<(), ServiceError> {
        let (subtasks,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM issues WHERE parent_id = $1")
                .bind(issue.id)
                .fetch_one(&self.pool)
                .await?;

        if subtasks > 0 && !delete_subtasks {
            return Err(ServiceError::validation(format!(
                "Issue '{}' has {} sub-tasks; pass deleteSubtasks=true to delete them as well",
                issue.key, subtasks
            )));
        }

        sqlx::query("DELETE FROM issues WHERE parent_id = $1")
            .bind(issue.id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(issue.id)
            .execute(&self.pool)
            .await?;

        tracing::info!("deleted issue {}", issue.key);
        Ok(())
    }

    /// Assigns an issue. None clears the assignee; "-1" applies the
    /// project's automatic assignee.
    pub async fn assign(&self, issue: &Issue, assignee: Option<&str>) -> Result<(), ServiceError> {
        let assignee_id = match assignee {
            None => None,
            Some("-1") => {
                let project = self.project(issue.project_id).await?;
                if project.assigns_to_lead_by_default() {
                    Some(project.lead_id)
                } else {
                    None
                }
            }
            Some(name) => Some(self.assignable_user(name).await?.id),
        };

        sqlx::query("UPDATE issues SET assignee_id = $2, updated_at = now() WHERE id = $1")
            .bind(issue.id)
            .bind(assignee_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- votes ---

    pub async fn add_vote(&self, issue: &Issue, user_id: Uuid) -> Result<(), ServiceError> {
        if issue.reporter_id == user_id {
            return Err(ServiceError::validation(
                "The reporter of an issue cannot vote for it",
            ));
        }
        if issue.resolution_id.is_some() {
            return Err(ServiceError::validation(
                "Cannot vote on a resolved issue",
            ));
        }

        sqlx::query(
            "INSERT INTO issue_votes (issue_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(issue.id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_vote(&self, issue: &Issue, user_id: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM issue_votes WHERE issue_id = $1 AND user_id = $2")
            .bind(issue.id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found(
                "You have not voted for this issue".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn voters(&self, issue: &Issue) -> Result<Vec<User>, ServiceError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u JOIN issue_votes v ON v.user_id = u.id
             WHERE v.issue_id = $1 ORDER BY u.name",
        )
        .bind(issue.id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn vote_state(&self, issue: &Issue, user_id: Uuid) -> Result<(i64, bool), ServiceError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM issue_votes WHERE issue_id = $1")
                .bind(issue.id)
                .fetch_one(&self.pool)
                .await?;
        let (voted,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM issue_votes WHERE issue_id = $1 AND user_id = $2)",
        )
        .bind(issue.id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((count, voted))
    }

    // --- watchers ---

    pub async fn add_watcher(&self, issue: &Issue, user_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO issue_watchers (issue_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(issue.id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_watcher(&self, issue: &Issue, user_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM issue_watchers WHERE issue_id = $1 AND user_id = $2")
            .bind(issue.id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn watchers(&self, issue: &Issue) -> Result<Vec<User>, ServiceError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u JOIN issue_watchers w ON w.user_id = u.id
             WHERE w.issue_id = $1 ORDER BY u.name",
        )
        .bind(issue.id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn watch_state(&self, issue: &Issue, user_id: Uuid) -> Result<(i64, bool), ServiceError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM issue_watchers WHERE issue_id = $1")
                .bind(issue.id)
                .fetch_one(&self.pool)
                .await?;
        let (watching,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM issue_watchers WHERE issue_id = $1 AND user_id = $2)",
        )
        .bind(issue.id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((count, watching))
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

    /// Resolves everything the issue view needs.
    pub async fn view_data(&self, issue: Issue, viewer_id: Uuid) -> Result<IssueViewData, ServiceError> {
        let project = self.project(issue.project_id).await?;
        let issue_type = self.catalog.issue_type(issue.issue_type_id).await?;
        let status = self.catalog.status(issue.status_id).await?;

        let priority = match issue.priority_id {
            Some(id) => Some(self.catalog.priority(id).await?),
            None => None,
        };
        let resolution = match issue.resolution_id {
            Some(id) => Some(self.catalog.resolution(id).await?),
            None => None,
        };
        let security_level = match issue.security_level_id {
            Some(id) => self
                .catalog
                .security_levels(project.id)
                .await?
                .into_iter()
                .find(|level| level.id == id),
            None => None,
        };

        let assignee = match issue.assignee_id {
            Some(id) => self.user_by_id(id).await?,
            None => None,
        };
        let reporter = self.user_by_id(issue.reporter_id).await?;
        let parent = match issue.parent_id {
            Some(id) => sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
            None => None,
        };

        let comment_rows = sqlx::query_as::<_, crate::models::Comment>(
            "SELECT * FROM comments WHERE issue_id = $1 ORDER BY created_at",
        )
        .bind(issue.id)
        .fetch_all(&self.pool)
        .await?;
        let mut comments = Vec::with_capacity(comment_rows.len());
        for comment in comment_rows {
            let author = self.user_by_id(comment.author_id).await?;
            comments.push((comment, author));
        }

        let attachment_rows = sqlx::query_as::<_, crate::models::Attachment>(
            "SELECT * FROM attachments WHERE issue_id = $1 ORDER BY created_at",
        )
        .bind(issue.id)
        .fetch_all(&self.pool)
        .await?;
        let mut attachments = Vec::with_capacity(attachment_rows.len());
        for attachment in attachment_rows {
            let author = self.user_by_id(attachment.author_id).await?;
            attachments.push((attachment, author));
        }

        let (vote_count, has_voted) = self.vote_state(&issue, viewer_id).await?;
        let (watch_count, is_watching) = self.watch_state(&issue, viewer_id).await?;

        Ok(IssueViewData {
            issue,
            project,
            issue_type,
            status,
            priority,
            resolution,
            security_level,
            assignee,
            reporter,
            parent,
            comments,
            attachments,
            vote_count,
            has_voted,
            watch_count,
            is_watching,
        })
    }

    /// Parses and validates the screen-settable field values present in a
    /// request.
    pub(crate) async fn parse_field_values(
        &self,
        inputs: &FieldInputs,
        catalog: &FieldCatalog,
        project: &Project,
    ) -> Result<ParsedFields, ServiceError> {
        let mut parsed = ParsedFields::default();

        if let Some(value) = inputs.get("summary") {
            let summary = issue_input::string_value(value)
                .ok_or_else(|| ServiceError::validation("'summary' must be a string"))?;
            if summary.trim().is_empty() {
                return Err(ServiceError::validation("'summary' must not be blank"));
            }
            parsed.summary = Some(summary.to_string());
        }

        if let Some(value) = inputs.get("description") {
            parsed.description = issue_input::string_value(value).map(str::to_string);
        }

        if let Some(value) = inputs.get("priority") {
            if !value.is_null() {
                let id = issue_input::ref_id(value)
                    .ok_or_else(|| ServiceError::validation("'priority' must reference an id"))?;
                parsed.priority_id = Some(self.catalog.priority(id).await?.id);
            }
        }

        if let Some(value) = inputs.get("resolution") {
            if !value.is_null() {
                let id = issue_input::ref_id(value)
                    .ok_or_else(|| ServiceError::validation("'resolution' must reference an id"))?;
                parsed.resolution_id = Some(self.catalog.resolution(id).await?.id);
            }
        }

        if let Some(value) = inputs.get("security") {
            if !value.is_null() {
                let id = issue_input::ref_id(value)
                    .ok_or_else(|| ServiceError::validation("'security' must reference an id"))?;
                let levels = self.catalog.security_levels(project.id).await?;
                if !levels.iter().any(|level| level.id == id) {
                    return Err(ServiceError::validation(format!(
                        "Security level '{}' is not valid for project '{}'",
                        id, project.key
                    )));
                }
                parsed.security_level_id = Some(id);
            }
        }

        if let Some(value) = inputs.get("assignee") {
            if !value.is_null() {
                let name = issue_input::ref_name(value)
                    .ok_or_else(|| ServiceError::validation("'assignee' must reference a user by name"))?;
                parsed.assignee_id = Some(self.assignable_user(name).await?.id);
            }
        }

        if let Some(value) = inputs.get("labels") {
            parsed.labels = Some(issue_input::labels_value(value)?);
        }

        if let Some(value) = inputs.get("duedate") {
            if !value.is_null() {
                parsed.due_date = Some(issue_input::date_value("duedate", value)?);
            }
        }

        for def in catalog.iter().filter(|def| def.is_custom()) {
            if let Some(value) = inputs.get(&def.id) {
                let value = validate_custom_value(def, value)?;
                parsed.custom.insert(def.id.clone(), value);
            }
        }

        Ok(parsed)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ParsedFields {
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) priority_id: Option<i64>,
    pub(crate) resolution_id: Option<i64>,
    pub(crate) security_level_id: Option<i64>,
    pub(crate) assignee_id: Option<Uuid>,
    pub(crate) labels: Option<Vec<String>>,
    pub(crate) due_date: Option<chrono::NaiveDate>,
    pub(crate) custom: Map<String, Value>,
}

fn validate_custom_value(def: &FieldDef, value: &Value) -> Result<Value, ServiceError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let FieldKind::Custom(kind) = &def.kind else {
        return Ok(value.clone());
    };

    let ok = match kind {
        CustomKind::Text => value.is_string(),
        CustomKind::Number => value.is_number(),
        CustomKind::Date => value
            .as_str()
            .map_or(false, |s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        CustomKind::UserPicker => issue_input::ref_name(value).is_some(),
        CustomKind::Select => option_exists(def, value),
        CustomKind::MultiSelect => value
            .as_array()
            .map_or(false, |items| items.iter().all(|item| option_exists(def, item))),
    };

    if ok {
        Ok(value.clone())
    } else {
        Err(ServiceError::validation(format!(
            "Value for field '{}' is not valid",
            def.id
        )))
    }
}

fn option_exists(def: &FieldDef, value: &Value) -> bool {
    let Some(id) = issue_input::ref_id(value) else {
        return false;
    };
    def.options
        .as_ref()
        .map_or(false, |options| options.iter().any(|o| o.id == id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::registry::CustomOption;
    use serde_json::json;

    fn select_field() -> FieldDef {
        FieldDef::custom(
            9,
            "Flavour",
            CustomKind::Select,
            true,
            Some(vec![CustomOption {
                id: 100,
                value: "vanilla".to_string(),
            }]),
            None,
        )
    }

    #[test]
    fn select_values_must_match_declared_options() {
        let def = select_field();
        assert!(validate_custom_value(&def, &json!({"id": 100})).is_ok());
        assert!(validate_custom_value(&def, &json!({"id": 999})).is_err());
    }

    #[test]
    fn multiselect_checks_every_entry() {
        let def = FieldDef::custom(
            10,
            "Toppings",
            CustomKind::MultiSelect,
            true,
            Some(vec![
                CustomOption { id: 1, value: "nuts".to_string() },
                CustomOption { id: 2, value: "fudge".to_string() },
            ]),
            None,
        );
        assert!(validate_custom_value(&def, &json!([{"id": 1}, {"id": 2}])).is_ok());
        assert!(validate_custom_value(&def, &json!([{"id": 1}, {"id": 3}])).is_err());
    }

    #[test]
    fn typed_custom_values_are_checked() {
        let number = FieldDef::custom(11, "Points", CustomKind::Number, true, None, None);
        assert!(validate_custom_value(&number, &json!(5)).is_ok());
        assert!(validate_custom_value(&number, &json!("five")).is_err());

        let date = FieldDef::custom(12, "Target", CustomKind::Date, true, None, None);
        assert!(validate_custom_value(&date, &json!("2026-01-31")).is_ok());
        assert!(validate_custom_value(&date, &json!("31/01/2026")).is_err());

        // Null always clears
        assert!(validate_custom_value(&number, &Value::Null).is_ok());
    }
}
