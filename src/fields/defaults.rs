use serde_json::Value;

use crate::models::Project;

use super::registry::{FieldDef, FieldKind, SystemField};

/// Answers "does this field have a configured default value" for the
/// metadata assemblers. Closed decision table: custom fields classify their
/// stored default by value kind, a handful of system fields consult project
/// configuration, everything else yields None (no answer is computed).
#[derive(Debug, Clone)]
pub struct DefaultFieldMetaHelper {
    project: Project,
}

impl DefaultFieldMetaHelper {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn has_default_value(&self, field: &FieldDef) -> Option<bool> {
        match &field.kind {
            FieldKind::Custom(_) => Some(custom_default_present(field.default_value.as_ref())),
            FieldKind::System(SystemField::Priority) => {
                Some(self.project.default_priority_id.is_some())
            }
            FieldKind::System(SystemField::Assignee) => {
                Some(self.project.assigns_to_lead_by_default())
            }
            FieldKind::System(SystemField::Security) => {
                Some(self.project.default_security_level_id.is_some())
            }
            _ => None,
        }
    }
}

/// Blank strings, empty arrays, and objects with only null entries do not
/// count as defaults.
fn custom_default_present(default: Option<&Value>) -> bool {
    match default {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => map.values().any(|v| !v.is_null()),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::registry::{CustomKind, FieldDef};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn project(default_priority: Option<i64>, default_assignee: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            key: "TRK".to_string(),
            name: "Tracker".to_string(),
            description: String::new(),
            lead_id: Uuid::new_v4(),
            default_assignee: default_assignee.to_string(),
            default_priority_id: default_priority,
            default_security_level_id: None,
            create_screen_id: 1,
            edit_screen_id: 1,
            counter: 0,
            created_at: Utc::now(),
        }
    }

    fn custom_with_default(default: Option<Value>) -> FieldDef {
        FieldDef::custom(1, "Custom", CustomKind::Text, true, None, default)
    }

    #[test]
    fn custom_defaults_classified_by_value_kind() {
        let helper = DefaultFieldMetaHelper::new(project(None, "unassigned"));

        assert_eq!(helper.has_default_value(&custom_with_default(None)), Some(false));
        assert_eq!(
            helper.has_default_value(&custom_with_default(Some(json!("  ")))),
            Some(false)
        );
        assert_eq!(
            helper.has_default_value(&custom_with_default(Some(json!("x")))),
            Some(true)
        );
        assert_eq!(
            helper.has_default_value(&custom_with_default(Some(json!([])))),
            Some(false)
        );
        assert_eq!(
            helper.has_default_value(&custom_with_default(Some(json!(["a"])))),
            Some(true)
        );
        assert_eq!(
            helper.has_default_value(&custom_with_default(Some(json!({"a": null})))),
            Some(false)
        );
        assert_eq!(
            helper.has_default_value(&custom_with_default(Some(json!({"a": 1})))),
            Some(true)
        );
    }

    #[test]
    fn priority_default_follows_project_configuration() {
        let fields = crate::fields::registry::system_fields();
        let priority = fields.iter().find(|f| f.id == "priority").unwrap();

        let helper = DefaultFieldMetaHelper::new(project(Some(3), "unassigned"));
        assert_eq!(helper.has_default_value(priority), Some(true));

        let helper = DefaultFieldMetaHelper::new(project(None, "unassigned"));
        assert_eq!(helper.has_default_value(priority), Some(false));
    }

    #[test]
    fn assignee_default_means_project_lead() {
        let fields = crate::fields::registry::system_fields();
        let assignee = fields.iter().find(|f| f.id == "assignee").unwrap();

        let helper = DefaultFieldMetaHelper::new(project(None, "lead"));
        assert_eq!(helper.has_default_value(assignee), Some(true));

        let helper = DefaultFieldMetaHelper::new(project(None, "unassigned"));
        assert_eq!(helper.has_default_value(assignee), Some(false));
    }

    #[test]
    fn fields_outside_the_table_get_no_answer() {
        let fields = crate::fields::registry::system_fields();
        let summary = fields.iter().find(|f| f.id == "summary").unwrap();

        let helper = DefaultFieldMetaHelper::new(project(None, "unassigned"));
        assert_eq!(helper.has_default_value(summary), None);
    }
}
