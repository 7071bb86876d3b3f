//! JSON schema for portable template documents.

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static TEMPLATE_DOCUMENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": [
            "id", "name", "createdAt", "updatedAt", "widgets",
            "widgetCount", "widgetTypeCounts", "widgetTypes", "canvasSize", "requiresSetup"
        ],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "name": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "author": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "createdAt": { "type": "string" },
            "updatedAt": { "type": "string" },
            "previewImage": { "type": "string" },
            "widgetCount": { "type": "integer", "minimum": 0 },
            "widgetTypeCounts": {
                "type": "object",
                "additionalProperties": { "type": "integer", "minimum": 1 }
            },
            "widgetTypes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["type", "name", "icon", "count"],
                    "properties": {
                        "type": { "type": "string" },
                        "name": { "type": "string" },
                        "icon": { "type": "string" },
                        "count": { "type": "integer", "minimum": 1 }
                    }
                }
            },
            "canvasSize": { "type": "string", "pattern": "^[0-9]+x[0-9]+$" },
            "requiresSetup": { "type": "array", "items": { "type": "string" } },
            "widgets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["type", "position"],
                    "properties": {
                        "type": { "type": "string", "minLength": 1 },
                        "properties": {
                            "type": "object",
                            "additionalProperties": { "type": ["string", "number", "boolean", "array"] }
                        },
                        "position": {
                            "type": "object",
                            "required": ["x", "y", "width", "height"],
                            "properties": {
                                "x": { "type": "integer" },
                                "y": { "type": "integer" },
                                "width": { "type": "integer", "minimum": 0 },
                                "height": { "type": "integer", "minimum": 0 }
                            }
                        }
                    }
                }
            }
        }
    })
});

static COMPILED_TEMPLATE_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    JSONSchema::compile(&TEMPLATE_DOCUMENT_SCHEMA).expect("template document schema compiles")
});

pub fn template_document_schema() -> &'static Value {
    &TEMPLATE_DOCUMENT_SCHEMA
}

/// Returns `None` when the document conforms, otherwise one message per
/// violation prefixed with its instance path.
pub fn validate_template_document(document: &Value) -> Option<Vec<String>> {
    let errors: Vec<String> = COMPILED_TEMPLATE_SCHEMA
        .validate(document)
        .err()
        .map(|errors| {
            errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", path, error)
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::validate_template_document;
    use serde_json::json;

    fn document() -> serde_json::Value {
        json!({
            "id": "t1",
            "name": "Ops",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "widgetCount": 1,
            "widgetTypeCounts": { "clock": 1 },
            "widgetTypes": [{ "type": "clock", "name": "Clock", "icon": "🕐", "count": 1 }],
            "canvasSize": "200x120",
            "requiresSetup": [],
            "widgets": [{
                "type": "clock",
                "properties": { "title": "Desk", "format24h": true },
                "position": { "x": 0, "y": 0, "width": 200, "height": 120 }
            }]
        })
    }

    #[test]
    fn accepts_well_formed_document() {
        assert!(validate_template_document(&document()).is_none());
    }

    #[test]
    fn reports_nested_property_objects_with_path() {
        let mut value = document();
        value["widgets"][0]["properties"]["title"] = json!({ "nested": true });
        let errors = validate_template_document(&value).expect("errors");
        assert!(errors.iter().any(|error| error.starts_with("/widgets/0/properties/title")));
    }

    #[test]
    fn requires_summary_fields() {
        let mut value = document();
        value.as_object_mut().expect("object").remove("canvasSize");
        assert!(validate_template_document(&value).is_some());
        let mut value = document();
        value["canvasSize"] = json!("wide");
        assert!(validate_template_document(&value).is_some());
    }
}
