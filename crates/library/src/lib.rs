//! Book CRUD REST API with generated OpenAPI documentation.
//!
//! A [`DefaultRouter`] maps a resource prefix to the six standard routes of a
//! [`ModelViewSet`]. The viewset is generic over any [`ModelSerializer`] and
//! stores records through a [`Repository`]. The docs view introspects the
//! registered resources to serve an OpenAPI document and a Swagger UI page.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use library::{Book, Config, MemoryRepository, server};
//!
//! # async fn run() -> Result<(), library::Error> {
//! let config = Config::default();
//! let app = server::app_router(&config, Arc::new(MemoryRepository::<Book>::new()))?;
//! let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Routes
//!
//! | Verb | Path | Action |
//! |------|------|--------|
//! | GET | `/` | API root |
//! | GET | `/books/` | list |
//! | POST | `/books/` | create |
//! | GET | `/books/{id}/` | retrieve |
//! | PUT | `/books/{id}/` | update |
//! | PATCH | `/books/{id}/` | partial update |
//! | DELETE | `/books/{id}/` | destroy |
//! | GET | `/docs/` | Swagger UI (`?format=openapi` for the document) |

pub mod config;
pub mod docs;
pub mod error;
pub mod model;
pub mod repository;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod viewset;

pub use crate::config::{Backend, Config, ConfigError, DatabaseConfig, DocsConfig, LogConfig, LogFormat, ServerConfig};
pub use error::{ApiError, Error};
pub use library_core::{
    Action, ErrorCode, ErrorResponse, FieldKind, FieldSpec, IntoErrorCode, ModelSerializer,
    ResourceRoutes, RouteError, ValidationErrors, ValidationMode,
};
pub use library_macros::ModelSerializer;
pub use model::Book;
pub use repository::{MemoryRepository, Repository, RepositoryArc, RepositoryError, SqliteRepository};
pub use router::{DefaultRouter, RegisteredResource};
pub use viewset::{JsonBody, ModelViewSet};
