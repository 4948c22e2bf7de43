use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use library_core::ModelSerializer;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{Record, Repository, RepositoryError, accept, decode};

/// SQLite repository.
///
/// One table per model: `id INTEGER PRIMARY KEY AUTOINCREMENT` plus a `data`
/// column holding the record as JSON text. `AUTOINCREMENT` keeps identifiers
/// of deleted rows from being handed out again.
#[derive(Debug, Clone)]
pub struct SqliteRepository<M> {
    pool: SqlitePool,
    _model: PhantomData<fn() -> M>,
}

impl<M: ModelSerializer> SqliteRepository<M> {
    /// Open a pool for `url`, creating the database file if missing.
    ///
    /// In-memory databases are private to each connection, so they get a
    /// single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            _model: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the model's table if it does not exist
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                id INTEGER PRIMARY KEY AUTOINCREMENT, \
                data TEXT NOT NULL\
            )",
            M::TABLE
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        tracing::debug!(table = M::TABLE, "table ready");
        Ok(())
    }
}

fn parse_record(model: &'static str, id: i64, data: &str) -> Result<Record, RepositoryError> {
    serde_json::from_str(data).map_err(|source| RepositoryError::Corrupt { model, id, source })
}

#[async_trait]
impl<M: ModelSerializer> Repository<M> for SqliteRepository<M> {
    async fn list(&self) -> Result<Vec<M>, RepositoryError> {
        let sql = format!("SELECT id, data FROM {} ORDER BY id ASC", M::TABLE);
        let rows: Vec<(i64, String)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|(id, data)| decode(id, parse_record(M::NAME, id, &data)?))
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Option<M>, RepositoryError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?", M::TABLE);
        let row: Option<(String,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(data,)| decode(id, parse_record(M::NAME, id, &data)?))
            .transpose()
    }

    async fn insert(&self, record: Record) -> Result<M, RepositoryError> {
        let data = serde_json::to_string(&record)?;
        let sql = format!("INSERT INTO {} (data) VALUES (?)", M::TABLE);

        let mut transaction = self.pool.begin().await?;
        let id = sqlx::query(&sql)
            .bind(&data)
            .execute(&mut *transaction)
            .await?
            .last_insert_rowid();
        let model = accept(id, record)?;
        transaction.commit().await?;

        Ok(model)
    }

    async fn update(&self, id: i64, changes: Record) -> Result<Option<M>, RepositoryError> {
        let select = format!("SELECT data FROM {} WHERE id = ?", M::TABLE);
        let update = format!("UPDATE {} SET data = ? WHERE id = ?", M::TABLE);

        let mut transaction = self.pool.begin().await?;
        let row: Option<(String,)> = sqlx::query_as(&select)
            .bind(id)
            .fetch_optional(&mut *transaction)
            .await?;
        let Some((data,)) = row else {
            return Ok(None);
        };

        let mut merged = parse_record(M::NAME, id, &data)?;
        merged.extend(changes);
        let model = accept(id, merged.clone())?;

        sqlx::query(&update)
            .bind(serde_json::to_string(&merged)?)
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        Ok(Some(model))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", M::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
