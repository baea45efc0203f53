//! Input-schema cleaning for the model API
//!
//! Gemini's function declarations reject the `additionalProperties` and
//! `$schema` keywords that MCP servers commonly emit.

use serde_json::Value;

/// Keys removed from every mapping node
pub const STRIPPED_KEYS: [&str; 2] = ["additionalProperties", "$schema"];

/// Recursively drop `additionalProperties` and `$schema` from a JSON schema.
///
/// Objects lose those keys and have their remaining values cleaned, arrays
/// have each element cleaned, scalars are returned unchanged.
pub fn clean_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !STRIPPED_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), clean_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(clean_schema).collect()),
        scalar => scalar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contains_stripped_key(value: &Value) -> bool {
        match value {
            Value::Object(map) => map
                .iter()
                .any(|(k, v)| STRIPPED_KEYS.contains(&k.as_str()) || contains_stripped_key(v)),
            Value::Array(items) => items.iter().any(contains_stripped_key),
            _ => false,
        }
    }

    #[test]
    fn test_strips_top_level_keys() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "additionalProperties": false,
            "properties": { "drug_name": { "type": "string" } },
            "required": ["drug_name"]
        });

        assert_eq!(
            clean_schema(&schema),
            json!({
                "type": "object",
                "properties": { "drug_name": { "type": "string" } },
                "required": ["drug_name"]
            })
        );
    }

    #[test]
    fn test_strips_at_any_depth() {
        let schema = json!({
            "type": "object",
            "properties": {
                "filters": {
                    "type": "object",
                    "additionalProperties": { "type": "string" },
                    "properties": {
                        "phases": {
                            "type": "array",
                            "items": { "type": "object", "$schema": "x", "additionalProperties": true }
                        }
                    }
                },
                "anyOf_field": {
                    "anyOf": [
                        { "type": "string", "additionalProperties": false },
                        [ { "$schema": "nested-in-array" } ]
                    ]
                }
            }
        });

        let cleaned = clean_schema(&schema);
        assert!(!contains_stripped_key(&cleaned));
        assert_eq!(cleaned["properties"]["filters"]["properties"]["phases"]["items"], json!({"type": "object"}));
        assert_eq!(cleaned["properties"]["anyOf_field"]["anyOf"], json!([{ "type": "string" }, [{}]]));
    }

    #[test]
    fn test_other_keys_untouched() {
        let schema = json!({
            "type": "object",
            "description": "additionalProperties is only a key when it is a key",
            "properties": {
                "schema": { "type": "string", "enum": ["$schema", "additionalProperties"] },
                "limit": { "type": "integer", "minimum": 1, "default": 10 }
            }
        });

        assert_eq!(clean_schema(&schema), schema);
    }

    #[test]
    fn test_idempotent() {
        let schema = json!({
            "$schema": "x",
            "type": "object",
            "properties": { "a": { "additionalProperties": false, "type": "object" } }
        });

        let once = clean_schema(&schema);
        assert_eq!(clean_schema(&once), once);
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(clean_schema(&json!(null)), json!(null));
        assert_eq!(clean_schema(&json!(42)), json!(42));
        assert_eq!(clean_schema(&json!("additionalProperties")), json!("additionalProperties"));
    }

    #[test]
    fn test_deep_nesting() {
        let mut schema = json!({ "type": "string", "$schema": "leaf" });
        for _ in 0..200 {
            schema = json!({ "type": "object", "additionalProperties": false, "properties": { "inner": schema } });
        }

        assert!(!contains_stripped_key(&clean_schema(&schema)));
    }
}
