use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Issue, IssueType, Project, ScreenTab, Transition};
use crate::services::permission::{Permission, PermissionService};
use crate::services::screens::ScreenService;
use crate::services::ServiceError;

use super::allowed::{allowed_values, AllowedValuesContext};
use super::defaults::DefaultFieldMetaHelper;
use super::included::IncludedFields;
use super::registry::{FieldCatalog, FieldDef};
use super::schema::FieldSchema;

/// Which workflow operation a metadata request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationContext {
    Create,
    Edit,
    Transition,
}

/// Per-field metadata record returned by the createmeta/editmeta/transition
/// endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMeta {
    pub required: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<FieldSchema>,
    #[serde(rename = "autoCompleteUrl", skip_serializing_if = "Option::is_none")]
    pub auto_complete_url: Option<String>,
    #[serde(rename = "hasDefaultValue", skip_serializing_if = "Option::is_none")]
    pub has_default_value: Option<bool>,
    pub operations: Vec<String>,
    #[serde(rename = "allowedValues", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

/// Request-scoped data shared by every assembler variant: the field lookup
/// table, catalog data for allowed values, the project, and (for variants
/// that compute it) the default-value helper.
pub struct MetaContext {
    pub catalog: FieldCatalog,
    pub allowed: AllowedValuesContext,
    pub project: Project,
    pub default_helper: Option<DefaultFieldMetaHelper>,
    pub base_url: String,
}

impl MetaContext {
    pub fn field(&self, field_id: &str) -> Option<&FieldDef> {
        self.catalog.get(field_id)
    }

    /// Assembles the metadata record for one field. Capability dispatch
    /// happens here: only REST-aware fields expose schema, auto-complete and
    /// allowed values; only operable fields list operations.
    pub fn field_meta(&self, def: &FieldDef, required: bool) -> FieldMeta {
        let rest_aware = def.is_rest_aware();
        FieldMeta {
            required,
            name: def.name.clone(),
            schema: def.schema(),
            auto_complete_url: if rest_aware {
                def.auto_complete_url(&self.base_url)
            } else {
                None
            },
            has_default_value: self
                .default_helper
                .as_ref()
                .and_then(|helper| helper.has_default_value(def)),
            operations: def.operations().iter().map(|op| op.as_str().to_string()).collect(),
            allowed_values: if rest_aware {
                allowed_values(def, &self.allowed, &self.base_url)
            } else {
                None
            },
        }
    }
}

/// Template for the metadata assembly flow. Variants supply the operation
/// tag, the permission gate, the screen to walk, the pseudo-fields to splice
/// in afterwards, and any per-field adjustment.
///
/// A denied permission produces an empty map, not an error: callers must
/// treat "no fields" under a denied check as exactly that.
#[async_trait]
pub trait MetaFieldAssembler: Send + Sync {
    fn operation(&self) -> OperationContext;
    fn context(&self) -> &MetaContext;

    async fn has_permission(&self) -> Result<bool, ServiceError>;
    async fn render_tabs(&self) -> Result<Vec<ScreenTab>, ServiceError>;

    /// Variant-specific synthetic fields, spliced in after the screen walk.
    /// These bypass the inclusion filter.
    async fn append_extra_fields(
        &self,
        fields: &mut BTreeMap<String, FieldMeta>,
    ) -> Result<(), ServiceError>;

    /// Variant-specific adjustment applied to each assembled record.
    fn adjust(&self, _field_id: &str, _meta: &mut FieldMeta) {}

    async fn build(
        &self,
        include: &IncludedFields,
    ) -> Result<BTreeMap<String, FieldMeta>, ServiceError> {
        let mut fields = BTreeMap::new();
        if !self.has_permission().await? {
            return Ok(fields);
        }

        let ctx = self.context();
        for tab in self.render_tabs().await? {
            for item in tab.items {
                let Some(def) = ctx.field(&item.field_id) else {
                    tracing::warn!("screen references unknown field '{}'", item.field_id);
                    continue;
                };
                if !include.included(&def.id, def.navigable) {
                    continue;
                }
                let mut meta = ctx.field_meta(def, item.required);
                self.adjust(&def.id, &mut meta);
                fields.insert(def.id.clone(), meta);
            }
        }

        self.append_extra_fields(&mut fields).await?;
        Ok(fields)
    }
}

/// Assembler for issue creation: create screen, Create Issues permission,
/// and the `project` / `issuetype` / (for sub-tasks) `parent` pseudo-fields.
pub struct CreateMetaAssembler {
    ctx: MetaContext,
    issue_type: IssueType,
    user_id: Uuid,
    permissions: Arc<dyn PermissionService>,
    screens: Arc<dyn ScreenService>,
}

impl CreateMetaAssembler {
    pub fn new(
        ctx: MetaContext,
        issue_type: IssueType,
        user_id: Uuid,
        permissions: Arc<dyn PermissionService>,
        screens: Arc<dyn ScreenService>,
    ) -> Self {
        Self {
            ctx,
            issue_type,
            user_id,
            permissions,
            screens,
        }
    }
}

#[async_trait]
impl MetaFieldAssembler for CreateMetaAssembler {
    fn operation(&self) -> OperationContext {
        OperationContext::Create
    }

    fn context(&self) -> &MetaContext {
        &self.ctx
    }

    async fn has_permission(&self) -> Result<bool, ServiceError> {
        self.permissions
            .has_permission(self.user_id, self.ctx.project.id, Permission::Create)
            .await
    }

    async fn render_tabs(&self) -> Result<Vec<ScreenTab>, ServiceError> {
        self.screens
            .create_screen_tabs(&self.ctx.project, &self.issue_type)
            .await
    }

    async fn append_extra_fields(
        &self,
        fields: &mut BTreeMap<String, FieldMeta>,
    ) -> Result<(), ServiceError> {
        if let Some(def) = self.ctx.field("project") {
            let mut meta = self.ctx.field_meta(def, true);
            meta.allowed_values = Some(vec![crate::views::project_ref(
                &self.ctx.project,
                &self.ctx.base_url,
            )]);
            fields.insert(def.id.clone(), meta);
        }

        if let Some(def) = self.ctx.field("issuetype") {
            let mut meta = self.ctx.field_meta(def, true);
            meta.allowed_values = Some(vec![crate::views::issue_type_ref(
                &self.issue_type,
                &self.ctx.base_url,
            )]);
            fields.insert(def.id.clone(), meta);
        }

        if self.issue_type.subtask {
            if let Some(def) = self.ctx.field("parent") {
                let meta = self.ctx.field_meta(def, true);
                fields.insert(def.id.clone(), meta);
            }
        }

        Ok(())
    }
}

/// Assembler for issue editing: edit screen, Edit Issues permission, and the
/// `comment` pseudo-field.
pub struct EditMetaAssembler {
    ctx: MetaContext,
    issue: Issue,
    user_id: Uuid,
    permissions: Arc<dyn PermissionService>,
    screens: Arc<dyn ScreenService>,
}

impl EditMetaAssembler {
    pub fn new(
        ctx: MetaContext,
        issue: Issue,
        user_id: Uuid,
        permissions: Arc<dyn PermissionService>,
        screens: Arc<dyn ScreenService>,
    ) -> Self {
        Self {
            ctx,
            issue,
            user_id,
            permissions,
            screens,
        }
    }
}

#[async_trait]
impl MetaFieldAssembler for EditMetaAssembler {
    fn operation(&self) -> OperationContext {
        OperationContext::Edit
    }

    fn context(&self) -> &MetaContext {
        &self.ctx
    }

    async fn has_permission(&self) -> Result<bool, ServiceError> {
        self.permissions
            .has_permission(self.user_id, self.ctx.project.id, Permission::Edit)
            .await
    }

    async fn render_tabs(&self) -> Result<Vec<ScreenTab>, ServiceError> {
        self.screens
            .edit_screen_tabs(&self.ctx.project, &self.issue)
            .await
    }

    async fn append_extra_fields(
        &self,
        fields: &mut BTreeMap<String, FieldMeta>,
    ) -> Result<(), ServiceError> {
        if let Some(def) = self.ctx.field("comment") {
            let meta = self.ctx.field_meta(def, false);
            fields.insert(def.id.clone(), meta);
        }
        Ok(())
    }
}

/// Assembler for workflow transitions: the transition's screen, Transition
/// Issues permission, no default-value computation, and `resolution` always
/// reported as required when present.
pub struct TransitionMetaAssembler {
    ctx: MetaContext,
    transition: Transition,
    user_id: Uuid,
    permissions: Arc<dyn PermissionService>,
    screens: Arc<dyn ScreenService>,
}

impl TransitionMetaAssembler {
    pub fn new(
        mut ctx: MetaContext,
        transition: Transition,
        user_id: Uuid,
        permissions: Arc<dyn PermissionService>,
        screens: Arc<dyn ScreenService>,
    ) -> Self {
        // This variant never computes default-value presence
        ctx.default_helper = None;
        Self {
            ctx,
            transition,
            user_id,
            permissions,
            screens,
        }
    }
}

#[async_trait]
impl MetaFieldAssembler for TransitionMetaAssembler {
    fn operation(&self) -> OperationContext {
        OperationContext::Transition
    }

    fn context(&self) -> &MetaContext {
        &self.ctx
    }

    async fn has_permission(&self) -> Result<bool, ServiceError> {
        self.permissions
            .has_permission(self.user_id, self.ctx.project.id, Permission::Transition)
            .await
    }

    async fn render_tabs(&self) -> Result<Vec<ScreenTab>, ServiceError> {
        self.screens.transition_screen_tabs(&self.transition).await
    }

    async fn append_extra_fields(
        &self,
        _fields: &mut BTreeMap<String, FieldMeta>,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    fn adjust(&self, field_id: &str, meta: &mut FieldMeta) {
        // Resolving a transition always demands a resolution, whatever the
        // screen configuration says.
        if field_id == "resolution" {
            meta.required = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::registry::{CustomKind, CustomOption, FieldDef};
    use crate::models::{LayoutItem, Priority};
    use chrono::Utc;
    use serde_json::json;

    struct StubPermissions(bool);

    #[async_trait]
    impl PermissionService for StubPermissions {
        async fn has_permission(
            &self,
            _user_id: Uuid,
            _project_id: Uuid,
            _permission: Permission,
        ) -> Result<bool, ServiceError> {
            Ok(self.0)
        }
    }

    struct StubScreens(Vec<ScreenTab>);

    #[async_trait]
    impl ScreenService for StubScreens {
        async fn create_screen_tabs(
            &self,
            _project: &Project,
            _issue_type: &IssueType,
        ) -> Result<Vec<ScreenTab>, ServiceError> {
            Ok(self.0.clone())
        }

        async fn edit_screen_tabs(
            &self,
            _project: &Project,
            _issue: &Issue,
        ) -> Result<Vec<ScreenTab>, ServiceError> {
            Ok(self.0.clone())
        }

        async fn transition_screen_tabs(
            &self,
            transition: &Transition,
        ) -> Result<Vec<ScreenTab>, ServiceError> {
            if transition.screen_id.is_none() {
                return Ok(vec![]);
            }
            Ok(self.0.clone())
        }
    }

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            key: "TRK".to_string(),
            name: "Tracker".to_string(),
            description: String::new(),
            lead_id: Uuid::new_v4(),
            default_assignee: "unassigned".to_string(),
            default_priority_id: Some(3),
            default_security_level_id: None,
            create_screen_id: 1,
            edit_screen_id: 1,
            counter: 0,
            created_at: Utc::now(),
        }
    }

    fn issue(project: &Project) -> Issue {
        Issue {
            id: Uuid::new_v4(),
            key: "TRK-1".to_string(),
            project_id: project.id,
            issue_type_id: 1,
            status_id: 1,
            priority_id: None,
            resolution_id: None,
            security_level_id: None,
            summary: "A bug".to_string(),
            description: None,
            assignee_id: None,
            reporter_id: Uuid::new_v4(),
            parent_id: None,
            labels: vec![],
            due_date: None,
            custom: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn issue_type(subtask: bool) -> IssueType {
        IssueType {
            id: if subtask { 4 } else { 1 },
            name: if subtask { "Sub-task" } else { "Bug" }.to_string(),
            subtask,
            description: String::new(),
        }
    }

    fn transition(screen: Option<i64>) -> Transition {
        Transition {
            id: 31,
            name: "Resolve Issue".to_string(),
            from_status_id: None,
            to_status_id: 3,
            screen_id: screen,
        }
    }

    fn allowed_ctx() -> AllowedValuesContext {
        AllowedValuesContext {
            priorities: vec![Priority {
                id: 1,
                name: "Blocker".to_string(),
                sequence: 1,
                status_color: "#cc0000".to_string(),
                description: String::new(),
            }],
            resolutions: vec![],
            issue_types: vec![],
            security_levels: vec![],
        }
    }

    fn meta_ctx(project: Project, custom: Vec<FieldDef>, with_defaults: bool) -> MetaContext {
        MetaContext {
            catalog: FieldCatalog::new(custom),
            allowed: allowed_ctx(),
            default_helper: if with_defaults {
                Some(DefaultFieldMetaHelper::new(project.clone()))
            } else {
                None
            },
            project,
            base_url: "http://localhost:3000".to_string(),
        }
    }

    fn screen(items: Vec<(&str, bool)>) -> Vec<ScreenTab> {
        vec![ScreenTab::new(
            "Field Tab",
            items
                .into_iter()
                .map(|(id, required)| LayoutItem::new(id, required))
                .collect(),
        )]
    }

    fn include_all() -> IncludedFields {
        IncludedFields::include_all_by_default::<&str>(&[])
    }

    #[tokio::test]
    async fn denied_permission_yields_empty_map() {
        let project = project();
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue_type(false),
            Uuid::new_v4(),
            Arc::new(StubPermissions(false)),
            Arc::new(StubScreens(screen(vec![("summary", true)]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn create_meta_includes_screen_fields_and_pseudo_fields() {
        let project = project();
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue_type(false),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![
                ("summary", true),
                ("priority", false),
            ]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();

        let summary = &fields["summary"];
        assert!(summary.required);
        assert_eq!(summary.operations, vec!["set"]);

        // Spliced pseudo-fields, not on the screen
        assert!(fields["project"].required);
        assert!(fields["issuetype"].required);
        assert!(!fields.contains_key("parent"));

        // Allowed values for priority went through the shortening transform
        let priority = &fields["priority"];
        let values = priority.allowed_values.as_ref().unwrap();
        assert_eq!(values[0]["name"], "Blocker");

        // Default helper ran: project configures a default priority
        assert_eq!(priority.has_default_value, Some(true));
    }

    #[tokio::test]
    async fn create_meta_for_subtask_type_includes_parent() {
        let project = project();
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue_type(true),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![("summary", true)]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        assert!(fields["parent"].required);
    }

    #[tokio::test]
    async fn inclusion_filter_prunes_screen_fields_but_not_pseudo_fields() {
        let project = project();
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue_type(false),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![
                ("summary", true),
                ("priority", false),
            ]))),
        );

        let include = IncludedFields::include_all_by_default(&["summary"]);
        let fields = assembler.build(&include).await.unwrap();

        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("priority"));
        // Pseudo-fields bypass the filter
        assert!(fields.contains_key("project"));
        assert!(fields.contains_key("issuetype"));
    }

    #[tokio::test]
    async fn excluded_field_is_dropped() {
        let project = project();
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue_type(false),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![
                ("summary", true),
                ("priority", false),
            ]))),
        );

        let include = IncludedFields::include_all_by_default(&["-priority"]);
        let fields = assembler.build(&include).await.unwrap();
        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("priority"));
    }

    #[tokio::test]
    async fn unknown_screen_fields_are_skipped() {
        let project = project();
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue_type(false),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![
                ("summary", true),
                ("no_such_field", false),
            ]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("no_such_field"));
    }

    #[tokio::test]
    async fn edit_meta_splices_comment_pseudo_field() {
        let project = project();
        let issue = issue(&project);
        let assembler = EditMetaAssembler::new(
            meta_ctx(project, vec![], true),
            issue,
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![("summary", true)]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        let comment = &fields["comment"];
        assert!(!comment.required);
        assert_eq!(comment.operations, vec!["add", "edit", "remove"]);
    }

    #[tokio::test]
    async fn transition_meta_forces_resolution_required() {
        let project = project();
        let assembler = TransitionMetaAssembler::new(
            meta_ctx(project, vec![], true),
            transition(Some(2)),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            // Screen says resolution is optional; the variant overrides it
            Arc::new(StubScreens(screen(vec![
                ("resolution", false),
                ("priority", false),
            ]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        assert!(fields["resolution"].required);

        // Transition variant skips default-value computation entirely
        assert_eq!(fields["priority"].has_default_value, None);
    }

    #[tokio::test]
    async fn transition_without_screen_has_no_fields() {
        let project = project();
        let assembler = TransitionMetaAssembler::new(
            meta_ctx(project, vec![], true),
            transition(None),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![("resolution", false)]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn custom_select_options_survive_untransformed() {
        let project = project();
        let custom = FieldDef::custom(
            9,
            "Flavour",
            CustomKind::Select,
            true,
            Some(vec![CustomOption {
                id: 100,
                value: "vanilla".to_string(),
            }]),
            None,
        );
        let assembler = CreateMetaAssembler::new(
            meta_ctx(project, vec![custom], true),
            issue_type(false),
            Uuid::new_v4(),
            Arc::new(StubPermissions(true)),
            Arc::new(StubScreens(screen(vec![("customfield_9", false)]))),
        );

        let fields = assembler.build(&include_all()).await.unwrap();
        let meta = &fields["customfield_9"];
        assert_eq!(
            meta.allowed_values.as_ref().unwrap()[0],
            json!({"id": 100, "value": "vanilla"})
        );
        assert_eq!(meta.schema.as_ref().unwrap().custom_id, Some(9));
    }
}
