//! Error types for OpenAPI assembly.

use thiserror::Error;

/// Errors that can occur while assembling a document.
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// Schema conflict: same name, different definitions.
    #[error("Schema conflict for '{name}': defined differently by multiple resources")]
    SchemaConflict { name: String },

    /// Two resources declared the same operation id.
    #[error("Duplicate operation id '{operation_id}' on {method} {path}")]
    DuplicateOperationId {
        operation_id: String,
        method: String,
        path: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
