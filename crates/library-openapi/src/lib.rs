//! OpenAPI document assembly for the library API.
//!
//! Typed path/operation structures, a builder that collects them into one
//! OpenAPI 3.0 document, and the HTML page that renders it with Swagger UI.
//!
//! # Example
//!
//! ```
//! use library_openapi::{OpenApiBuilder, OpenApiOperation, OpenApiPath};
//!
//! let spec = OpenApiBuilder::new()
//!     .title("Library example project")
//!     .version("v1")
//!     .merge_paths(vec![
//!         OpenApiPath::new("/books/", "get")
//!             .with_operation(OpenApiOperation::new("List all books").with_id("books_list")),
//!     ])
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(spec["paths"]["/books/"]["get"]["operationId"], "books_list");
//! ```

mod builder;
mod error;
mod types;
mod ui;

pub use builder::OpenApiBuilder;
pub use error::OpenApiError;
pub use types::*;
pub use ui::swagger_ui_html;

/// Result type for OpenAPI operations.
pub type Result<T> = std::result::Result<T, OpenApiError>;
