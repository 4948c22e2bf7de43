//! Declarative field mappings.
//!
//! A model type describes its wire fields once, as a static slice of
//! [`FieldSpec`]. Validation, storage conversion and schema generation all
//! read from that slice, so the handlers never name concrete fields.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Wire type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl FieldKind {
    /// JSON Schema `type` keyword
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Boolean => "boolean",
        }
    }

    /// OpenAPI `format` keyword, if any
    pub fn format(&self) -> Option<&'static str> {
        match self {
            FieldKind::Float => Some("double"),
            _ => None,
        }
    }
}

/// Static description of one serializer field.
///
/// Generated by `#[derive(ModelSerializer)]`; constructible in `const` context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Wire name, identical to the struct field name
    pub name: &'static str,
    pub kind: FieldKind,
    /// Must be present on create and full update
    pub required: bool,
    /// Accepts `null`
    pub nullable: bool,
    /// Ignored on input, present on output
    pub read_only: bool,
    /// Server-assigned identifier
    pub primary_key: bool,
    /// Strings only: accept empty / whitespace-only values
    pub allow_blank: bool,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Doc comment of the field
    pub description: Option<&'static str>,
}

impl FieldSpec {
    /// A required, writable, non-nullable field with no constraints
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            read_only: false,
            primary_key: false,
            allow_blank: false,
            max_length: None,
            min_length: None,
            min_value: None,
            max_value: None,
            description: None,
        }
    }

    pub fn is_writable(&self) -> bool {
        !self.read_only && !self.primary_key
    }

    /// Human title derived from the name: `published_year` -> `Published year`
    pub fn title(&self) -> String {
        let spaced = self.name.replace('_', " ");
        let mut chars = spaced.trim().chars();
        match chars.next() {
            None => String::new(),
            Some(first) => first.to_uppercase().chain(chars).collect(),
        }
    }
}

/// A persisted entity with a declarative wire mapping.
///
/// Records are stored as JSON objects holding every field except the primary
/// key; the key lives beside the record and is re-inserted on read.
pub trait ModelSerializer: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Singular display name ("Book"), also the schema component name
    const NAME: &'static str;

    /// Storage table name ("books")
    const TABLE: &'static str;

    /// Doc comment of the model, used as the schema description
    fn description() -> Option<&'static str> {
        None
    }

    /// Field specifications in declaration order
    fn fields() -> &'static [FieldSpec];

    /// Identifier of this instance
    fn primary_key(&self) -> i64;

    /// Name of the primary key field
    fn primary_key_field() -> &'static str {
        Self::fields()
            .iter()
            .find(|field| field.primary_key)
            .map(|field| field.name)
            .unwrap_or("id")
    }

    /// Rebuild an instance from its identifier and stored record
    fn from_record(id: i64, mut record: Map<String, Value>) -> Result<Self, serde_json::Error> {
        record.insert(Self::primary_key_field().to_string(), Value::from(id));
        serde_json::from_value(Value::Object(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: i64,
        body: String,
    }

    impl ModelSerializer for Note {
        const NAME: &'static str = "Note";
        const TABLE: &'static str = "notes";

        fn fields() -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec {
                    primary_key: true,
                    read_only: true,
                    ..FieldSpec::new("id", FieldKind::Integer)
                },
                FieldSpec::new("body", FieldKind::String),
            ];
            FIELDS
        }

        fn primary_key(&self) -> i64 {
            self.id
        }
    }

    #[test]
    fn test_title_from_name() {
        assert_eq!(
            FieldSpec::new("published_year", FieldKind::Integer).title(),
            "Published year"
        );
        assert_eq!(FieldSpec::new("id", FieldKind::Integer).title(), "Id");
    }

    #[test]
    fn test_primary_key_not_writable() {
        let fields = Note::fields();
        assert!(!fields[0].is_writable());
        assert!(fields[1].is_writable());
        assert_eq!(Note::primary_key_field(), "id");
    }

    #[test]
    fn test_from_record_restores_primary_key() {
        let mut record = Map::new();
        record.insert("body".to_string(), json!("hello"));

        let note = Note::from_record(4, record).unwrap();
        assert_eq!(
            note,
            Note {
                id: 4,
                body: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_from_record_rejects_bad_shape() {
        let mut record = Map::new();
        record.insert("body".to_string(), json!(12));
        assert!(Note::from_record(1, record).is_err());
    }
}
