//! JSON Schema fragments shared by the tool definitions.

use serde_json::{Map, Value, json};

pub(crate) const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// `{"type": "object", "properties": ..., "required": [...]}`.
pub(crate) fn object(properties: Value, required: &[&str]) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), properties);
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Value::Object(schema)
}

pub(crate) fn empty() -> Value {
    object(json!({}), &[])
}

pub(crate) fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub(crate) fn non_empty(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

pub(crate) fn integer(description: &str) -> Value {
    json!({ "type": "integer", "description": description })
}

pub(crate) fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

pub(crate) fn positive(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 1, "description": description })
}

pub(crate) fn one_of(values: &[&str], description: &str) -> Value {
    json!({ "type": "string", "enum": values, "description": description })
}

pub(crate) fn strings(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

pub(crate) fn date(description: &str) -> Value {
    json!({ "type": "string", "pattern": DATE_PATTERN, "description": description })
}

/// Seconds or `"1h 30m 45s"` notation.
pub(crate) fn time(description: &str) -> Value {
    json!({
        "anyOf": [
            { "type": "integer", "minimum": 1 },
            { "type": "string", "minLength": 1 }
        ],
        "description": description
    })
}

pub(crate) fn page() -> Value {
    positive("Page number for pagination (default: 1)")
}

pub(crate) fn limit(what: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": format!("Number of {what} per page (default: 100)")
    })
}

pub(crate) fn query(what: &str) -> Value {
    string(&format!("Search query to filter {what} by name"))
}

pub(crate) fn project_status() -> Value {
    one_of(&["active", "archived", "completed"], "Project status")
}

pub(crate) fn task_status() -> Value {
    one_of(&["open", "closed", "in_progress"], "Task status")
}

pub(crate) fn billing() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": { "type": "string", "enum": ["flat_rate", "hourly_rate", "none"], "description": "Billing type" },
            "budget": { "type": "number", "description": "Project budget" },
            "rate": { "type": "number", "description": "Hourly rate" }
        },
        "description": "Billing configuration"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_omits_empty_required() {
        assert_eq!(empty(), json!({"type": "object", "properties": {}}));
        let s = object(json!({"id": string("ID")}), &["id"]);
        assert_eq!(s["required"], json!(["id"]));
    }

    #[test]
    fn date_pattern_rejects_other_formats() {
        let validator = jsonschema::validator_for(&date("d")).expect("schema");
        assert!(validator.is_valid(&json!("2024-02-29")));
        assert!(!validator.is_valid(&json!("02/29/2024")));
    }
}
