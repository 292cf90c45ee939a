use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::FieldSchema;

/// Well-known system fields. Custom fields are declared at runtime and
/// dispatch on their [`CustomKind`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemField {
    Summary,
    Description,
    IssueType,
    Priority,
    Resolution,
    Assignee,
    Reporter,
    Labels,
    DueDate,
    Security,
    Status,
    Comment,
    Project,
    Parent,
    Created,
    Updated,
    Votes,
    Watches,
    Attachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomKind {
    Text,
    Number,
    Date,
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    #[serde(rename = "userpicker")]
    UserPicker,
}

impl CustomKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "select" => Some(Self::Select),
            "multiselect" => Some(Self::MultiSelect),
            "userpicker" => Some(Self::UserPicker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    System(SystemField),
    Custom(CustomKind),
}

/// Write operations a field advertises in metadata and accepts in edit
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOperation {
    Set,
    Add,
    Remove,
    Edit,
}

impl FieldOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOperation::Set => "set",
            FieldOperation::Add => "add",
            FieldOperation::Remove => "remove",
            FieldOperation::Edit => "edit",
        }
    }
}

/// Option of a select/multiselect custom field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomOption {
    pub id: i64,
    pub value: String,
}

/// A form field: a system field or a declared custom field. The capability
/// questions the metadata assembler asks (is it REST-aware? does it support
/// write operations?) are answered here by explicit dispatch on the kind.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    pub navigable: bool,
    pub orderable: bool,
    pub custom_id: Option<i64>,
    pub options: Option<Vec<CustomOption>>,
    pub default_value: Option<Value>,
}

impl FieldDef {
    fn system(id: &str, name: &str, field: SystemField, navigable: bool, orderable: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: FieldKind::System(field),
            navigable,
            orderable,
            custom_id: None,
            options: None,
            default_value: None,
        }
    }

    pub fn custom(
        custom_id: i64,
        name: &str,
        kind: CustomKind,
        navigable: bool,
        options: Option<Vec<CustomOption>>,
        default_value: Option<Value>,
    ) -> Self {
        Self {
            id: format!("customfield_{}", custom_id),
            name: name.to_string(),
            kind: FieldKind::Custom(kind),
            navigable,
            orderable: true,
            custom_id: Some(custom_id),
            options,
            default_value,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, FieldKind::Custom(_))
    }

    /// Whether the field can describe itself over REST (schema, allowed
    /// values, auto-complete). Vote and watch counts are sub-resources with
    /// no field representation of their own.
    pub fn is_rest_aware(&self) -> bool {
        !matches!(
            self.kind,
            FieldKind::System(SystemField::Votes) | FieldKind::System(SystemField::Watches)
        )
    }

    /// Write operations supported by the field; empty for read-only fields.
    pub fn operations(&self) -> &'static [FieldOperation] {
        use FieldOperation::*;
        match &self.kind {
            FieldKind::System(field) => match field {
                SystemField::Summary
                | SystemField::Description
                | SystemField::IssueType
                | SystemField::Priority
                | SystemField::Resolution
                | SystemField::Assignee
                | SystemField::DueDate
                | SystemField::Security
                | SystemField::Project
                | SystemField::Parent => &[Set],
                SystemField::Labels => &[Add, Remove, Set],
                SystemField::Comment => &[Add, Edit, Remove],
                SystemField::Reporter
                | SystemField::Status
                | SystemField::Created
                | SystemField::Updated
                | SystemField::Votes
                | SystemField::Watches
                | SystemField::Attachment => &[],
            },
            FieldKind::Custom(kind) => match kind {
                CustomKind::MultiSelect => &[Set, Add, Remove],
                _ => &[Set],
            },
        }
    }

    pub fn schema(&self) -> Option<FieldSchema> {
        if !self.is_rest_aware() {
            return None;
        }
        let schema = match &self.kind {
            FieldKind::System(field) => match field {
                SystemField::Summary => FieldSchema::system("string", "summary"),
                SystemField::Description => FieldSchema::system("string", "description"),
                SystemField::IssueType => FieldSchema::system("issuetype", "issuetype"),
                SystemField::Priority => FieldSchema::system("priority", "priority"),
                SystemField::Resolution => FieldSchema::system("resolution", "resolution"),
                SystemField::Assignee => FieldSchema::system("user", "assignee"),
                SystemField::Reporter => FieldSchema::system("user", "reporter"),
                SystemField::Labels => FieldSchema::system_array("string", "labels"),
                SystemField::DueDate => FieldSchema::system("date", "duedate"),
                SystemField::Security => FieldSchema::system("securitylevel", "security"),
                SystemField::Status => FieldSchema::system("status", "status"),
                SystemField::Comment => FieldSchema::system_array("comment", "comment"),
                SystemField::Project => FieldSchema::system("project", "project"),
                SystemField::Parent => FieldSchema::system("issuelink", "parent"),
                SystemField::Created => FieldSchema::system("datetime", "created"),
                SystemField::Updated => FieldSchema::system("datetime", "updated"),
                SystemField::Attachment => FieldSchema::system_array("attachment", "attachment"),
                SystemField::Votes | SystemField::Watches => unreachable!(),
            },
            FieldKind::Custom(kind) => {
                let id = self.custom_id.unwrap_or_default();
                match kind {
                    CustomKind::Text => FieldSchema::custom("string", "text", id),
                    CustomKind::Number => FieldSchema::custom("number", "number", id),
                    CustomKind::Date => FieldSchema::custom("date", "date", id),
                    CustomKind::Select => FieldSchema::custom("option", "select", id),
                    CustomKind::MultiSelect => FieldSchema::custom_array("option", "multiselect", id),
                    CustomKind::UserPicker => FieldSchema::custom("user", "userpicker", id),
                }
            }
        };
        Some(schema)
    }

    pub fn auto_complete_url(&self, base_url: &str) -> Option<String> {
        if !self.is_rest_aware() {
            return None;
        }
        match &self.kind {
            FieldKind::System(SystemField::Assignee)
            | FieldKind::Custom(CustomKind::UserPicker) => {
                Some(format!("{}/api/user/search?query=", base_url))
            }
            _ => None,
        }
    }
}

/// All system fields, in the order `/api/field` lists them.
pub fn system_fields() -> Vec<FieldDef> {
    use SystemField::*;
    vec![
        FieldDef::system("summary", "Summary", Summary, true, true),
        FieldDef::system("description", "Description", Description, true, true),
        FieldDef::system("issuetype", "Issue Type", IssueType, true, true),
        FieldDef::system("priority", "Priority", Priority, true, true),
        FieldDef::system("resolution", "Resolution", Resolution, true, true),
        FieldDef::system("assignee", "Assignee", Assignee, true, true),
        FieldDef::system("reporter", "Reporter", Reporter, true, true),
        FieldDef::system("labels", "Labels", Labels, true, true),
        FieldDef::system("duedate", "Due Date", DueDate, true, true),
        FieldDef::system("security", "Security Level", Security, true, true),
        FieldDef::system("status", "Status", Status, true, false),
        FieldDef::system("comment", "Comment", Comment, true, false),
        FieldDef::system("project", "Project", Project, true, true),
        FieldDef::system("parent", "Parent", Parent, false, false),
        FieldDef::system("created", "Created", Created, true, true),
        FieldDef::system("updated", "Updated", Updated, true, true),
        FieldDef::system("votes", "Votes", Votes, false, false),
        FieldDef::system("watches", "Watchers", Watches, false, false),
        FieldDef::system("attachment", "Attachment", Attachment, false, false),
    ]
}

/// Lookup table over system + custom fields for one request.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    by_id: HashMap<String, FieldDef>,
    order: Vec<String>,
}

impl FieldCatalog {
    pub fn new(custom: Vec<FieldDef>) -> Self {
        let mut catalog = Self::default();
        for def in system_fields().into_iter().chain(custom) {
            catalog.order.push(def.id.clone());
            catalog.by_id.insert(def.id.clone(), def);
        }
        catalog
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldDef> {
        self.by_id.get(field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}
