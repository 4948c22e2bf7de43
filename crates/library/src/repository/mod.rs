//! Storage of model records.
//!
//! Records are JSON objects holding every field except the primary key, which
//! the repository assigns. Identifiers increase monotonically and are never
//! reused after a delete.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use library_core::{ErrorCode, IntoErrorCode, ModelSerializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{Backend, DatabaseConfig};

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// A stored record: field name to value, primary key excluded
pub type Record = Map<String, Value>;

/// Shared handle to a repository
pub type RepositoryArc<M> = Arc<dyn Repository<M>>;

/// Persistence for one model type.
#[async_trait]
pub trait Repository<M: ModelSerializer>: Send + Sync {
    /// Every record, ordered by ascending identifier
    async fn list(&self) -> Result<Vec<M>, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Option<M>, RepositoryError>;

    /// Store a complete record under a newly assigned identifier
    async fn insert(&self, record: Record) -> Result<M, RepositoryError>;

    /// Merge `changes` into the stored record; `None` if `id` is unknown
    async fn update(&self, id: i64, changes: Record) -> Result<Option<M>, RepositoryError>;

    /// `false` if `id` is unknown
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// Errors raised by repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored {model} {id} does not match the model: {source}")]
    Corrupt {
        model: &'static str,
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    /// A record handed to `insert` or `update` that the model cannot represent
    #[error("{model} record rejected before storing: {source}")]
    Rejected {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("the sqlite backend requires database.url")]
    MissingUrl,
}

impl IntoErrorCode for RepositoryError {
    fn error_code(&self) -> ErrorCode {
        match self {
            RepositoryError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                ErrorCode::Unavailable
            }
            _ => ErrorCode::Internal,
        }
    }

    fn message(&self) -> String {
        self.error_code().default_message().to_string()
    }
}

/// Rebuild a model from a stored record, reporting mismatches as corruption
pub(crate) fn decode<M: ModelSerializer>(id: i64, record: Record) -> Result<M, RepositoryError> {
    M::from_record(id, record).map_err(|source| RepositoryError::Corrupt {
        model: M::NAME,
        id,
        source,
    })
}

/// Build the model a write would store; nothing is written on failure
pub(crate) fn accept<M: ModelSerializer>(id: i64, record: Record) -> Result<M, RepositoryError> {
    M::from_record(id, record).map_err(|source| RepositoryError::Rejected {
        model: M::NAME,
        source,
    })
}

/// Open the configured backend, creating its table if needed
pub async fn connect<M: ModelSerializer>(
    config: &DatabaseConfig,
) -> Result<RepositoryArc<M>, RepositoryError> {
    match config.backend {
        Backend::Memory => {
            tracing::info!(model = M::NAME, "using in-memory storage");
            Ok(Arc::new(MemoryRepository::<M>::new()))
        }
        Backend::Sqlite => {
            let url = config.url.as_deref().ok_or(RepositoryError::MissingUrl)?;
            let repository = SqliteRepository::<M>::connect(url, config.max_connections).await?;
            repository.migrate().await?;
            tracing::info!(model = M::NAME, %url, "using sqlite storage");
            Ok(Arc::new(repository))
        }
    }
}
