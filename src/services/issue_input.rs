use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::ScreenTab;

use super::ServiceError;

/// The `fields` object of a create/edit/transition request body, plus the
/// optional `update` section (comment operations).
#[derive(Debug, Default)]
pub struct FieldInputs {
    fields: Map<String, Value>,
    pub comment_additions: Vec<String>,
}

impl FieldInputs {
    pub fn parse(body: &Value) -> Result<Self, ServiceError> {
        let fields = match body.get("fields") {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(ServiceError::validation("'fields' must be an object")),
        };

        let mut comment_additions = Vec::new();
        if let Some(update) = body.get("update") {
            let ops = update
                .get("comment")
                .and_then(|c| c.as_array())
                .cloned()
                .unwrap_or_default();
            for op in ops {
                if let Some(body) = op.get("add").and_then(|a| a.get("body")).and_then(|b| b.as_str())
                {
                    comment_additions.push(body.to_string());
                }
            }
        }

        Ok(Self {
            fields,
            comment_additions,
        })
    }

    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.fields.get(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.comment_additions.is_empty()
    }

    /// Rejects fields that are not on the operation's screen (or in the
    /// operation's extra allowance). Fields not on the screen cannot be set;
    /// submitting one is a validation error, field by field.
    pub fn validate_against_screen(
        &self,
        tabs: &[ScreenTab],
        extra_allowed: &[&str],
    ) -> Result<(), ServiceError> {
        let mut on_screen: Vec<&str> = tabs
            .iter()
            .flat_map(|tab| tab.items.iter().map(|item| item.field_id.as_str()))
            .collect();
        on_screen.extend_from_slice(extra_allowed);

        let mut field_errors = HashMap::new();
        for id in self.ids() {
            if !on_screen.contains(&id.as_str()) {
                field_errors.insert(
                    id.clone(),
                    format!(
                        "Field '{}' cannot be set. It is not on the appropriate screen, or unknown.",
                        id
                    ),
                );
            }
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::field_validation(
                "Some fields cannot be set",
                field_errors,
            ))
        }
    }

    /// Ensures every required screen field is present. Used on create; edits
    /// leave absent fields unchanged.
    pub fn validate_required(&self, tabs: &[ScreenTab]) -> Result<(), ServiceError> {
        let mut field_errors = HashMap::new();
        for tab in tabs {
            for item in &tab.items {
                if item.required && !self.contains(&item.field_id) {
                    field_errors.insert(
                        item.field_id.clone(),
                        format!("Field '{}' is required.", item.field_id),
                    );
                }
            }
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::field_validation(
                "Missing required fields",
                field_errors,
            ))
        }
    }
}

/// `{"id": "3"}` (or a bare number) to a numeric id.
pub fn ref_id(value: &Value) -> Option<i64> {
    match value.get("id") {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => value.as_i64(),
    }
}

/// `{"name": "..."}` to the referenced name.
pub fn ref_name(value: &Value) -> Option<&str> {
    value.get("name").and_then(|n| n.as_str())
}

/// `{"key": "TRK"}` to the referenced key.
pub fn ref_key(value: &Value) -> Option<&str> {
    value.get("key").and_then(|k| k.as_str())
}

pub fn string_value(value: &Value) -> Option<&str> {
    value.as_str()
}

pub fn labels_value(value: &Value) -> Result<Vec<String>, ServiceError> {
    let items = value
        .as_array()
        .ok_or_else(|| ServiceError::validation("'labels' must be an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ServiceError::validation("'labels' must be an array of strings"))
        })
        .collect()
}

pub fn date_value(field_id: &str, value: &Value) -> Result<NaiveDate, ServiceError> {
    let raw = value.as_str().ok_or_else(|| {
        ServiceError::validation(format!("Field '{}' must be a date string", field_id))
    })?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ServiceError::validation(format!(
            "Field '{}' must be a date in YYYY-MM-DD format",
            field_id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LayoutItem;
    use serde_json::json;

    fn tabs() -> Vec<ScreenTab> {
        vec![ScreenTab::new(
            "Field Tab",
            vec![
                LayoutItem::new("summary", true),
                LayoutItem::new("priority", false),
            ],
        )]
    }

    #[test]
    fn off_screen_field_is_rejected_with_field_error() {
        let inputs = FieldInputs::parse(&json!({
            "fields": {"summary": "x", "reporter": {"name": "fred"}}
        }))
        .unwrap();

        let err = inputs.validate_against_screen(&tabs(), &[]).unwrap_err();
        match err {
            ServiceError::FieldValidation { field_errors, .. } => {
                assert!(field_errors.contains_key("reporter"));
                assert!(!field_errors.contains_key("summary"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn extra_allowance_admits_pseudo_fields() {
        let inputs = FieldInputs::parse(&json!({
            "fields": {"summary": "x", "project": {"key": "TRK"}}
        }))
        .unwrap();

        inputs
            .validate_against_screen(&tabs(), &["project", "issuetype"])
            .unwrap();
    }

    #[test]
    fn missing_required_field_is_reported() {
        let inputs = FieldInputs::parse(&json!({"fields": {"priority": {"id": "1"}}})).unwrap();
        let err = inputs.validate_required(&tabs()).unwrap_err();
        match err {
            ServiceError::FieldValidation { field_errors, .. } => {
                assert_eq!(field_errors["summary"], "Field 'summary' is required.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn parses_comment_additions_from_update_section() {
        let inputs = FieldInputs::parse(&json!({
            "fields": {},
            "update": {"comment": [{"add": {"body": "done"}}, {"remove": {}}]}
        }))
        .unwrap();
        assert_eq!(inputs.comment_additions, vec!["done".to_string()]);
    }

    #[test]
    fn ref_helpers() {
        assert_eq!(ref_id(&json!({"id": "3"})), Some(3));
        assert_eq!(ref_id(&json!({"id": 3})), Some(3));
        assert_eq!(ref_id(&json!("nope")), None);
        assert_eq!(ref_name(&json!({"name": "fred"})), Some("fred"));
        assert_eq!(ref_key(&json!({"key": "TRK"})), Some("TRK"));
    }

    #[test]
    fn date_parsing() {
        assert!(date_value("duedate", &json!("2026-03-01")).is_ok());
        assert!(date_value("duedate", &json!("01/03/2026")).is_err());
        assert!(date_value("duedate", &json!(42)).is_err());
    }
}
