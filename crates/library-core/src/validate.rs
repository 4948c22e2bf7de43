//! Field-level validation of request bodies.
//!
//! [`validate`] walks the writable fields of a model, coerces each supplied
//! value to the field's wire type and checks its constraints. Every failure is
//! collected; nothing short-circuits except a body that is not an object.

use serde_json::{Map, Number, Value};

use crate::error::{NON_FIELD_ERRORS, ValidationErrors};
use crate::field::{FieldKind, FieldSpec};

const REQUIRED: &str = "This field is required.";
const NULL: &str = "This field may not be null.";
const BLANK: &str = "This field may not be blank.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";

/// Which write operation the body is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// `POST`: required fields must be present, absent nullable fields become `null`
    Create,
    /// `PUT`: required fields must be present, absent optional fields are left alone
    Update,
    /// `PATCH`: only supplied fields are checked
    Partial,
}

/// Validate `data` against `fields`.
///
/// Returns the cleaned values of the writable fields that should be written.
/// Read-only and unknown keys in `data` are ignored.
pub fn validate(
    fields: &[FieldSpec],
    data: &Value,
    mode: ValidationMode,
) -> Result<Map<String, Value>, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let Value::Object(input) = data else {
        errors.add(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(data)
            ),
        );
        return Err(errors);
    };

    let mut cleaned = Map::new();
    for field in fields.iter().filter(|field| field.is_writable()) {
        match input.get(field.name) {
            None => match mode {
                ValidationMode::Partial => {}
                _ if field.required => errors.add(field.name, REQUIRED),
                ValidationMode::Create if field.nullable => {
                    cleaned.insert(field.name.to_string(), Value::Null);
                }
                _ => {}
            },
            Some(Value::Null) => {
                if field.nullable {
                    cleaned.insert(field.name.to_string(), Value::Null);
                } else {
                    errors.add(field.name, NULL);
                }
            }
            Some(value) => match clean_value(field, value) {
                Ok(value) => {
                    cleaned.insert(field.name.to_string(), value);
                }
                Err(messages) => {
                    for message in messages {
                        errors.add(field.name, message);
                    }
                }
            },
        }
    }

    errors.into_result(cleaned)
}

fn clean_value(field: &FieldSpec, value: &Value) -> Result<Value, Vec<String>> {
    match field.kind {
        FieldKind::String => clean_string(field, value).map(Value::String),
        FieldKind::Integer => {
            let n = to_integer(value).ok_or_else(|| vec![INVALID_INTEGER.to_string()])?;
            check_range(field, n as f64)?;
            Ok(Value::from(n))
        }
        FieldKind::Float => {
            let n = to_float(value).ok_or_else(|| vec![INVALID_NUMBER.to_string()])?;
            check_range(field, n)?;
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| vec![INVALID_NUMBER.to_string()])
        }
        FieldKind::Boolean => to_boolean(value)
            .map(Value::Bool)
            .ok_or_else(|| vec![INVALID_BOOLEAN.to_string()]),
    }
}

fn clean_string(field: &FieldSpec, value: &Value) -> Result<String, Vec<String>> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(vec![INVALID_STRING.to_string()]),
    };

    if text.is_empty() {
        if field.allow_blank {
            return Ok(text);
        }
        return Err(vec![BLANK.to_string()]);
    }

    let mut messages = Vec::new();
    let len = text.chars().count();
    if let Some(max) = field.max_length
        && len > max
    {
        messages.push(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    if let Some(min) = field.min_length
        && len < min
    {
        messages.push(format!("Ensure this field has at least {min} characters."));
    }

    if messages.is_empty() { Ok(text) } else { Err(messages) }
}

fn check_range(field: &FieldSpec, n: f64) -> Result<(), Vec<String>> {
    let mut messages = Vec::new();
    if let Some(max) = field.max_value
        && n > max
    {
        messages.push(format!(
            "Ensure this value is less than or equal to {}.",
            format_limit(max)
        ));
    }
    if let Some(min) = field.min_value
        && n < min
    {
        messages.push(format!(
            "Ensure this value is greater than or equal to {}.",
            format_limit(min)
        ));
    }
    if messages.is_empty() { Ok(()) } else { Err(messages) }
}

/// `9999.0` prints as `9999`, `0.5` as `0.5`
fn format_limit(limit: f64) -> String {
    if limit.fract() == 0.0 && limit.abs() < i64::MAX as f64 {
        (limit as i64).to_string()
    } else {
        limit.to_string()
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn to_float(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64()? {
            1 => Some(true),
            0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Type names reported for non-object bodies
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec {
            primary_key: true,
            read_only: true,
            ..FieldSpec::new("id", FieldKind::Integer)
        },
        FieldSpec {
            max_length: Some(10),
            ..FieldSpec::new("title", FieldKind::String)
        },
        FieldSpec {
            required: false,
            nullable: true,
            min_value: Some(0.0),
            max_value: Some(9999.0),
            ..FieldSpec::new("year", FieldKind::Integer)
        },
        FieldSpec {
            required: false,
            ..FieldSpec::new("in_print", FieldKind::Boolean)
        },
        FieldSpec {
            required: false,
            nullable: true,
            ..FieldSpec::new("rating", FieldKind::Float)
        },
    ];

    fn messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
        errors.get(field).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn test_create_fills_nullable_fields() {
        let cleaned = validate(FIELDS, &json!({"title": "Dune"}), ValidationMode::Create).unwrap();
        assert_eq!(
            Value::Object(cleaned),
            json!({"title": "Dune", "year": null, "rating": null})
        );
    }

    #[test]
    fn test_missing_required_field() {
        let errors = validate(FIELDS, &json!({}), ValidationMode::Create).unwrap_err();
        assert_eq!(messages(&errors, "title"), vec![REQUIRED]);
        assert_eq!(errors.len(), 1);

        let errors = validate(FIELDS, &json!({}), ValidationMode::Update).unwrap_err();
        assert_eq!(messages(&errors, "title"), vec![REQUIRED]);

        assert!(validate(FIELDS, &json!({}), ValidationMode::Partial).unwrap().is_empty());
    }

    #[test]
    fn test_update_leaves_absent_optional_fields_out() {
        let cleaned = validate(FIELDS, &json!({"title": "Dune"}), ValidationMode::Update).unwrap();
        assert_eq!(Value::Object(cleaned), json!({"title": "Dune"}));
    }

    #[test]
    fn test_read_only_and_unknown_fields_ignored() {
        let cleaned = validate(
            FIELDS,
            &json!({"id": 99, "title": "Dune", "publisher": "Chilton"}),
            ValidationMode::Partial,
        )
        .unwrap();
        assert_eq!(Value::Object(cleaned), json!({"title": "Dune"}));
    }

    #[test]
    fn test_errors_are_collected() {
        let errors = validate(
            FIELDS,
            &json!({"title": null, "year": "soon", "in_print": "maybe"}),
            ValidationMode::Create,
        )
        .unwrap_err();

        assert_eq!(messages(&errors, "title"), vec![NULL]);
        assert_eq!(messages(&errors, "year"), vec![INVALID_INTEGER]);
        assert_eq!(messages(&errors, "in_print"), vec![INVALID_BOOLEAN]);
    }

    #[test]
    fn test_string_rules() {
        let check = |value: Value| {
            validate(FIELDS, &json!({ "title": value }), ValidationMode::Partial)
        };

        assert_eq!(check(json!("  Dune  ")).unwrap()["title"], "Dune");
        assert_eq!(check(json!(1984)).unwrap()["title"], "1984");
        assert_eq!(messages(&check(json!("   ")).unwrap_err(), "title"), vec![BLANK]);
        assert_eq!(messages(&check(json!(true)).unwrap_err(), "title"), vec![INVALID_STRING]);
        assert_eq!(messages(&check(json!(["a"])).unwrap_err(), "title"), vec![INVALID_STRING]);
        assert_eq!(
            messages(&check(json!("abcdefghijk")).unwrap_err(), "title"),
            vec!["Ensure this field has no more than 10 characters."]
        );
        // characters, not bytes
        assert!(check(json!("éééééééééé")).is_ok());
    }

    #[test]
    fn test_allow_blank_and_min_length() {
        const NOTES: &[FieldSpec] = &[FieldSpec {
            allow_blank: true,
            min_length: Some(3),
            ..FieldSpec::new("note", FieldKind::String)
        }];

        let cleaned = validate(NOTES, &json!({"note": "  "}), ValidationMode::Create).unwrap();
        assert_eq!(cleaned["note"], "");

        let errors = validate(NOTES, &json!({"note": "ab"}), ValidationMode::Create).unwrap_err();
        assert_eq!(
            messages(&errors, "note"),
            vec!["Ensure this field has at least 3 characters."]
        );
    }

    #[test]
    fn test_integer_coercion_and_range() {
        let check = |value: Value| {
            validate(FIELDS, &json!({ "year": value }), ValidationMode::Partial)
        };

        assert_eq!(check(json!(1965)).unwrap()["year"], 1965);
        assert_eq!(check(json!(1965.0)).unwrap()["year"], 1965);
        assert_eq!(check(json!(" 1965 ")).unwrap()["year"], 1965);
        assert_eq!(check(json!(null)).unwrap()["year"], Value::Null);
        assert!(check(json!(1965.5)).is_err());
        assert!(check(json!(true)).is_err());
        assert_eq!(
            messages(&check(json!(10000)).unwrap_err(), "year"),
            vec!["Ensure this value is less than or equal to 9999."]
        );
        assert_eq!(
            messages(&check(json!(-1)).unwrap_err(), "year"),
            vec!["Ensure this value is greater than or equal to 0."]
        );
    }

    #[test]
    fn test_float_and_boolean_coercion() {
        let cleaned = validate(
            FIELDS,
            &json!({"rating": "4.5", "in_print": "Yes"}),
            ValidationMode::Partial,
        )
        .unwrap();
        assert_eq!(cleaned["rating"], 4.5);
        assert_eq!(cleaned["in_print"], true);

        let cleaned = validate(
            FIELDS,
            &json!({"rating": 3, "in_print": 0}),
            ValidationMode::Partial,
        )
        .unwrap();
        assert_eq!(cleaned["rating"], 3.0);
        assert_eq!(cleaned["in_print"], false);

        let errors = validate(
            FIELDS,
            &json!({"rating": "NaN", "in_print": 2}),
            ValidationMode::Partial,
        )
        .unwrap_err();
        assert_eq!(messages(&errors, "rating"), vec![INVALID_NUMBER]);
        assert_eq!(messages(&errors, "in_print"), vec![INVALID_BOOLEAN]);
    }

    #[test]
    fn test_non_object_body() {
        let cases = [
            (json!([]), "list"),
            (json!("x"), "str"),
            (json!(3), "int"),
            (json!(3.5), "float"),
            (json!(false), "bool"),
            (Value::Null, "NoneType"),
        ];

        for (body, name) in cases {
            let errors = validate(FIELDS, &body, ValidationMode::Create).unwrap_err();
            assert_eq!(
                messages(&errors, NON_FIELD_ERRORS),
                vec![format!("Invalid data. Expected a dictionary, but got {name}.")]
            );
        }
    }
}
