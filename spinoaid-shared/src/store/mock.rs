/// No-op document store
///
/// Accepts every write and never returns data: finds are empty, inserts hand
/// back a fresh id, updates and deletes match nothing. Running the API on it
/// reproduces a deployment with no database attached, where registration
/// succeeds but login always fails and every lookup is a 404.

use super::{Document, DocumentStore, Filter, FindOptions, StoreResult, UpdateOutcome};
use async_trait::async_trait;
use uuid::Uuid;

/// Mock [`DocumentStore`] that persists nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct MockStore;

impl MockStore {
    /// Creates a mock store
    pub fn new() -> Self {
        MockStore
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    fn backend(&self) -> &'static str {
        "mock"
    }

    async fn create_unique_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        tracing::trace!(collection, field, "mock store ignoring index");
        Ok(())
    }

    async fn find(
        &self,
        _collection: &str,
        _filter: &Filter,
        _options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn find_one(
        &self,
        _collection: &str,
        _filter: &Filter,
        _options: FindOptions,
    ) -> StoreResult<Option<Document>> {
        Ok(None)
    }

    async fn insert(&self, collection: &str, _doc: Document) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        tracing::trace!(collection, %id, "mock store discarding insert");
        Ok(id)
    }

    async fn update(
        &self,
        _collection: &str,
        _filter: &Filter,
        _changes: Document,
    ) -> StoreResult<UpdateOutcome> {
        Ok(UpdateOutcome::default())
    }

    async fn delete(&self, _collection: &str, _filter: &Filter) -> StoreResult<u64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_store_persists_nothing() {
        let store = MockStore::new();
        let doc = json!({ "email": "a@x.io" }).as_object().cloned().unwrap();

        let id = store.insert("users", doc.clone()).await.unwrap();
        assert!(!id.is_empty());

        let found = store
            .find_one("users", &Filter::new().eq("id", id), FindOptions::default())
            .await
            .unwrap();
        assert!(found.is_none());

        let all = store.find("users", &Filter::new(), FindOptions::default()).await.unwrap();
        assert!(all.is_empty());

        let outcome = store.update("users", &Filter::new(), doc).await.unwrap();
        assert_eq!(outcome.matched, 0);
        assert_eq!(store.delete("users", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_store_never_conflicts() {
        let store = MockStore::new();
        store.create_unique_index("users", "email").await.unwrap();

        let doc = json!({ "email": "a@x.io" }).as_object().cloned().unwrap();
        assert!(store.insert("users", doc.clone()).await.is_ok());
        assert!(store.insert("users", doc).await.is_ok());
    }
}
