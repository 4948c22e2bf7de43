//! OpenAPI document builder.

use crate::Result;
use crate::error::OpenApiError;
use crate::types::{OpenApiPath, OpenApiSchema, OpenApiTag};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Builder collecting typed paths and schemas into one OpenAPI 3.0 document.
///
/// # Example
///
/// ```
/// use library_openapi::{OpenApiBuilder, OpenApiSchema};
/// use serde_json::json;
///
/// let spec = OpenApiBuilder::new()
///     .title("Library example project")
///     .version("v1")
///     .merge_schemas(vec![OpenApiSchema::new("Book", json!({"type": "object"}))])
///     .unwrap()
///     .build();
///
/// assert_eq!(spec["components"]["schemas"]["Book"]["type"], "object");
/// ```
///
/// # Conflict Resolution
///
/// - **Paths**: Last write wins for the same path+method.
/// - **Operation ids**: must be unique across the document.
/// - **Schemas**: Identical schemas are deduplicated; different schemas with same name cause an error.
#[derive(Debug, Clone, Default)]
pub struct OpenApiBuilder {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    tags: Vec<OpenApiTag>,
    paths: Map<String, Value>,
    operation_ids: HashSet<String>,
    schemas: Map<String, Value>,
}

impl OpenApiBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the API version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the API description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a top-level tag; repeated names keep the first declaration.
    pub fn tag(mut self, tag: OpenApiTag) -> Self {
        if !self.tags.iter().any(|t| t.name == tag.name) {
            self.tags.push(tag);
        }
        self
    }

    /// Merge typed paths.
    pub fn merge_paths(mut self, paths: Vec<OpenApiPath>) -> Result<Self> {
        for path_def in paths {
            if let Some(id) = &path_def.operation.operation_id
                && !self.operation_ids.insert(id.clone())
            {
                return Err(OpenApiError::DuplicateOperationId {
                    operation_id: id.clone(),
                    method: path_def.method.to_uppercase(),
                    path: path_def.path,
                });
            }

            let operation = serde_json::to_value(&path_def.operation)?;
            let path_entry = self
                .paths
                .entry(path_def.path)
                .or_insert_with(|| Value::Object(Map::new()));

            if let Some(path_obj) = path_entry.as_object_mut() {
                path_obj.insert(path_def.method.to_lowercase(), operation);
            }
        }
        Ok(self)
    }

    /// Merge typed schemas.
    pub fn merge_schemas(mut self, schemas: Vec<OpenApiSchema>) -> Result<Self> {
        for schema_def in schemas {
            self.merge_schema(schema_def.name, schema_def.schema)?;
        }
        Ok(self)
    }

    /// Merge a single schema with conflict detection.
    fn merge_schema(&mut self, name: String, schema: Value) -> Result<()> {
        if let Some(existing) = self.schemas.get(&name) {
            if existing != &schema {
                return Err(OpenApiError::SchemaConflict { name });
            }
        } else {
            self.schemas.insert(name, schema);
        }
        Ok(())
    }

    /// Build the final document.
    pub fn build(self) -> Value {
        let mut spec = Map::new();

        spec.insert("openapi".to_string(), Value::String("3.0.3".to_string()));

        let mut info = Map::new();
        info.insert(
            "title".to_string(),
            Value::String(self.title.unwrap_or_else(|| "API".to_string())),
        );
        info.insert(
            "version".to_string(),
            Value::String(self.version.unwrap_or_else(|| "0.1.0".to_string())),
        );
        if let Some(desc) = self.description {
            info.insert("description".to_string(), Value::String(desc));
        }
        spec.insert("info".to_string(), Value::Object(info));

        if !self.tags.is_empty() {
            let tags = self
                .tags
                .into_iter()
                .filter_map(|tag| serde_json::to_value(tag).ok())
                .collect();
            spec.insert("tags".to_string(), Value::Array(tags));
        }

        // `paths` is mandatory in 3.0
        spec.insert("paths".to_string(), Value::Object(self.paths));

        if !self.schemas.is_empty() {
            let mut components = Map::new();
            components.insert("schemas".to_string(), Value::Object(self.schemas));
            spec.insert("components".to_string(), Value::Object(components));
        }

        Value::Object(spec)
    }
}
