//! Core traits and types for the library API.
//!
//! This crate holds everything that is independent of the HTTP runtime:
//!
//! - [`ErrorCode`] and [`ErrorResponse`]: the error taxonomy and its wire body
//! - [`Action`] and [`ResourceRoutes`]: the verb/path conventions of a resource
//! - [`FieldSpec`] and [`ModelSerializer`]: declarative field mappings
//! - [`validate`]: the field-level validation engine
//! - [`model_schema`]: JSON Schema generation from field specifications
//!
//! `#[derive(ModelSerializer)]` (from `library-macros`) generates code against
//! the items re-exported here.

pub mod error;
pub mod field;
pub mod route;
pub mod schema;
pub mod validate;

pub use error::{ErrorCode, ErrorResponse, IntoErrorCode, NON_FIELD_ERRORS, ValidationErrors};
pub use field::{FieldKind, FieldSpec, ModelSerializer};
pub use route::{Action, HttpMethod, LOOKUP_PARAM, ResourceRoutes, Route, RouteError};
pub use schema::{error_response_schema, model_schema};
pub use validate::{ValidationMode, validate};

// Re-export serde_json for generated code
pub use serde_json;
