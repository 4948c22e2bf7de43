use std::collections::BTreeMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use library_core::ModelSerializer;
use tokio::sync::RwLock;

use super::{Record, Repository, RepositoryError, accept, decode};

/// In-memory repository.
///
/// Records live in an ordered map, so listing is by ascending identifier.
#[derive(Debug)]
pub struct MemoryRepository<M> {
    state: RwLock<State>,
    _model: PhantomData<fn() -> M>,
}

#[derive(Debug)]
struct State {
    records: BTreeMap<i64, Record>,
    next_id: i64,
}

impl<M> Default for MemoryRepository<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> MemoryRepository<M> {
    /// Creates a new empty repository; the first identifier is 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                records: BTreeMap::new(),
                next_id: 1,
            }),
            _model: PhantomData,
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<M: ModelSerializer> Repository<M> for MemoryRepository<M> {
    async fn list(&self) -> Result<Vec<M>, RepositoryError> {
        let state = self.state.read().await;
        state
            .records
            .iter()
            .map(|(&id, record)| decode(id, record.clone()))
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Option<M>, RepositoryError> {
        let state = self.state.read().await;
        state
            .records
            .get(&id)
            .map(|record| decode(id, record.clone()))
            .transpose()
    }

    async fn insert(&self, record: Record) -> Result<M, RepositoryError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        let model = accept(id, record.clone())?;
        state.records.insert(id, record);
        state.next_id += 1;
        Ok(model)
    }

    async fn update(&self, id: i64, changes: Record) -> Result<Option<M>, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.records.get_mut(&id) else {
            return Ok(None);
        };

        let mut merged = stored.clone();
        merged.extend(changes);
        let model = accept(id, merged.clone())?;
        *stored = merged;
        Ok(Some(model))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.state.write().await.records.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Book;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn test_rejected_record_does_not_consume_id() {
        let repo = MemoryRepository::<Book>::new();

        let result = repo.insert(record(json!({"title": 5}))).await;
        assert!(matches!(result, Err(RepositoryError::Rejected { model: "Book", .. })));
        assert!(repo.is_empty().await);

        let book = repo
            .insert(record(json!({"title": "Dune", "author": "Frank Herbert", "published_year": null})))
            .await
            .unwrap();
        assert_eq!(book.id, 1);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_intact() {
        let repo = MemoryRepository::<Book>::new();
        repo.insert(record(json!({"title": "Dune", "author": "Frank Herbert", "published_year": 1965})))
            .await
            .unwrap();

        let result = repo.update(1, record(json!({"published_year": "soon"}))).await;
        assert!(matches!(result, Err(RepositoryError::Rejected { .. })));

        let book = repo.get(1).await.unwrap().unwrap();
        assert_eq!(book.published_year, Some(1965));
    }
}
