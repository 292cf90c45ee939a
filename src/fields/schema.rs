use serde::{Deserialize, Serialize};

/// JSON type descriptor advertised for a field in metadata responses.
/// System fields carry their system name; custom fields carry the custom
/// kind and numeric id instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(rename = "customId", skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<i64>,
}

impl FieldSchema {
    pub fn system(schema_type: &str, system: &str) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            items: None,
            system: Some(system.to_string()),
            custom: None,
            custom_id: None,
        }
    }

    pub fn system_array(items: &str, system: &str) -> Self {
        Self {
            schema_type: "array".to_string(),
            items: Some(items.to_string()),
            system: Some(system.to_string()),
            custom: None,
            custom_id: None,
        }
    }

    pub fn custom(schema_type: &str, custom: &str, custom_id: i64) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            items: None,
            system: None,
            custom: Some(custom.to_string()),
            custom_id: Some(custom_id),
        }
    }

    pub fn custom_array(items: &str, custom: &str, custom_id: i64) -> Self {
        Self {
            schema_type: "array".to_string(),
            items: Some(items.to_string()),
            system: None,
            custom: Some(custom.to_string()),
            custom_id: Some(custom_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_schema_serializes_without_custom_keys() {
        let schema = FieldSchema::system("priority", "priority");
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["type"], "priority");
        assert_eq!(value["system"], "priority");
        assert!(value.get("custom").is_none());
        assert!(value.get("customId").is_none());
    }

    #[test]
    fn custom_array_schema_carries_id() {
        let schema = FieldSchema::custom_array("option", "multiselect", 12);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["type"], "array");
        assert_eq!(value["items"], "option");
        assert_eq!(value["customId"], 12);
    }
}
