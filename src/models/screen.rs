use serde::{Deserialize, Serialize};

/// A rendered screen tab: the ordered fields a screen shows for one
/// operation, after layout resolution. Consumed read-only by the
/// field-metadata assemblers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenTab {
    pub name: String,
    pub items: Vec<LayoutItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutItem {
    pub field_id: String,
    pub required: bool,
}

impl ScreenTab {
    pub fn new(name: impl Into<String>, items: Vec<LayoutItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

impl LayoutItem {
    pub fn new(field_id: impl Into<String>, required: bool) -> Self {
        Self {
            field_id: field_id.into(),
            required,
        }
    }
}
