use serde_json::{json, Value};

use crate::models::{IssueType, Priority, Resolution, SecurityLevel};
use crate::views;

use super::registry::{CustomKind, FieldDef, FieldKind, SystemField};

/// Catalog data an assembler draws allowed values from. Issue types and
/// security levels are already scoped to the request's project by the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct AllowedValuesContext {
    pub priorities: Vec<Priority>,
    pub resolutions: Vec<Resolution>,
    pub issue_types: Vec<IssueType>,
    pub security_levels: Vec<SecurityLevel>,
}

/// Maps a field's declared allowed-values collection to wire form. The
/// recognised subtypes get a bean-shortening transform; any other collection
/// (custom select options) passes through unchanged. Fields without a
/// values collection yield None.
pub fn allowed_values(
    field: &FieldDef,
    ctx: &AllowedValuesContext,
    base_url: &str,
) -> Option<Vec<Value>> {
    match &field.kind {
        FieldKind::System(SystemField::Priority) => Some(
            ctx.priorities
                .iter()
                .map(|p| views::priority_ref(p, base_url))
                .collect(),
        ),
        FieldKind::System(SystemField::Resolution) => Some(
            ctx.resolutions
                .iter()
                .map(|r| views::resolution_ref(r, base_url))
                .collect(),
        ),
        FieldKind::System(SystemField::IssueType) => Some(
            ctx.issue_types
                .iter()
                .map(|t| views::issue_type_ref(t, base_url))
                .collect(),
        ),
        FieldKind::System(SystemField::Security) => Some(
            ctx.security_levels
                .iter()
                .map(|s| views::security_level_ref(s, base_url))
                .collect(),
        ),
        FieldKind::Custom(CustomKind::Select) | FieldKind::Custom(CustomKind::MultiSelect) => {
            field.options.as_ref().map(|options| {
                options
                    .iter()
                    .map(|o| json!({"id": o.id, "value": o.value}))
                    .collect()
            })
        }
        _ => None,
    }
}
