//! JSON Schema generation from field specifications.
//!
//! Output follows the OpenAPI 3.0 dialect (`nullable` instead of type arrays).

use serde_json::{Map, Value, json};

use crate::error::ErrorCode;
use crate::field::{FieldKind, FieldSpec};

/// Object schema for a model.
///
/// `required` lists the writable required fields; the primary key is marked
/// `readOnly` so clients know not to send it.
pub fn model_schema(name: &str, description: Option<&str>, fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        properties.insert(field.name.to_string(), property_schema(field));
        if field.required && field.is_writable() {
            required.push(Value::String(field.name.to_string()));
        }
    }

    let mut schema = Map::new();
    schema.insert("title".to_string(), json!(name));
    if let Some(description) = description {
        schema.insert("description".to_string(), json!(description));
    }
    schema.insert("type".to_string(), json!("object"));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema.insert("properties".to_string(), Value::Object(properties));
    Value::Object(schema)
}

fn property_schema(field: &FieldSpec) -> Value {
    let mut prop = Map::new();
    prop.insert("title".to_string(), json!(field.title()));
    prop.insert("type".to_string(), json!(field.kind.json_type()));
    if let Some(format) = field.kind.format() {
        prop.insert("format".to_string(), json!(format));
    }
    if let Some(description) = field.description {
        prop.insert("description".to_string(), json!(description));
    }
    if !field.is_writable() {
        prop.insert("readOnly".to_string(), json!(true));
    }
    if field.nullable {
        prop.insert("nullable".to_string(), json!(true));
    }

    if field.kind == FieldKind::String {
        if let Some(max) = field.max_length {
            prop.insert("maxLength".to_string(), json!(max));
        }
        let min = match field.min_length {
            Some(min) => Some(min),
            None if !field.allow_blank => Some(1),
            None => None,
        };
        if let Some(min) = min {
            prop.insert("minLength".to_string(), json!(min));
        }
    }

    if let Some(min) = field.min_value {
        prop.insert("minimum".to_string(), limit(field.kind, min));
    }
    if let Some(max) = field.max_value {
        prop.insert("maximum".to_string(), limit(field.kind, max));
    }

    Value::Object(prop)
}

/// Integer fields keep integral bounds (`9999`, not `9999.0`)
fn limit(kind: FieldKind, value: f64) -> Value {
    if kind == FieldKind::Integer && value.fract() == 0.0 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Schema of the JSON error body shared by every operation
pub fn error_response_schema() -> Value {
    let codes: Vec<&str> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
    json!({
        "title": "ErrorResponse",
        "type": "object",
        "required": ["code", "message"],
        "properties": {
            "code": {
                "title": "Code",
                "type": "string",
                "enum": codes
            },
            "message": {
                "title": "Message",
                "type": "string"
            },
            "details": {
                "title": "Details",
                "description": "Messages per field name, or under `non_field_errors`",
                "type": "object",
                "additionalProperties": {
                    "type": "array",
                    "items": {"type": "string"}
                }
            }
        }
    })
}
