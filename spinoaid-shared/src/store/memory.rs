/// In-process document store
///
/// Keeps every collection in memory behind a single `tokio::sync::RwLock`.
/// Writes that touch a unique index check and apply under the same write
/// lock, so two concurrent inserts of the same key cannot both succeed.
///
/// Data lives for the lifetime of the process.

use super::{
    compare_values, Document, DocumentStore, Filter, FindOptions, SortOrder, StoreError,
    StoreResult, UpdateOutcome, ID_FIELD,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Collection {
    /// Documents in insertion order
    docs: Vec<Document>,

    /// Fields that must be unique
    unique: HashSet<String>,
}

impl Collection {
    /// Finds a unique field whose value in `doc` is already taken
    ///
    /// `skip` excludes one position (the document being updated).
    fn conflicting_field(&self, doc: &Document, skip: Option<usize>) -> Option<String> {
        self.unique.iter().find_map(|field| {
            let value = doc.get(field)?;
            let taken = self
                .docs
                .iter()
                .enumerate()
                .any(|(i, other)| Some(i) != skip && other.get(field) == Some(value));
            taken.then(|| field.clone())
        })
    }

    fn matching(&self, filter: &Filter, options: &FindOptions) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .docs
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();

        // Descending is the exact reverse of ascending, ties included
        if let Some((field, order)) = &options.sort {
            docs.sort_by(|a, b| compare_values(a.get(field), b.get(field)));
            if *order == SortOrder::Descending {
                docs.reverse();
            }
        }

        if let Some(limit) = options.limit {
            docs.truncate(limit);
        }

        docs
    }
}

/// Memory-backed [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.docs.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_unique_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        let mut seen = HashSet::new();
        for doc in &coll.docs {
            if let Some(value) = doc.get(field) {
                if !seen.insert(value.to_string()) {
                    return Err(StoreError::Duplicate {
                        collection: collection.to_string(),
                        field: field.to_string(),
                    });
                }
            }
        }

        coll.unique.insert(field.to_string());
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.matching(filter, &options))
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Option<Document>> {
        let docs = self.find(collection, filter, options.limit(1)).await?;
        Ok(docs.into_iter().next())
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<String> {
        let id = match doc.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        // The primary key is always unique
        if coll
            .docs
            .iter()
            .any(|other| other.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                field: ID_FIELD.to_string(),
            });
        }

        if let Some(field) = coll.conflicting_field(&doc, None) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                field,
            });
        }

        coll.docs.push(doc);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> StoreResult<UpdateOutcome> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };

        let Some(pos) = coll.docs.iter().position(|doc| filter.matches(doc)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut updated = coll.docs[pos].clone();
        for (field, value) in changes {
            updated.insert(field, value);
        }

        if let Some(field) = coll.conflicting_field(&updated, Some(pos)) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                field,
            });
        }

        let modified = u64::from(coll.docs[pos] != updated);
        coll.docs[pos] = updated;

        Ok(UpdateOutcome {
            matched: 1,
            modified,
        })
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match coll.docs.iter().position(|doc| filter.matches(doc)) {
            Some(pos) => {
                coll.docs.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryStore::new();
        let id = store.insert("users", doc(json!({ "email": "a@x.io" }))).await.unwrap();

        assert!(Uuid::parse_str(&id).is_ok());

        let found = store
            .find_one("users", &Filter::new().eq("id", id.clone()), FindOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["email"], "a@x.io");
    }

    #[tokio::test]
    async fn test_insert_keeps_explicit_id() {
        let store = MemoryStore::new();
        let id = store
            .insert("users", doc(json!({ "id": "fixed", "email": "a@x.io" })))
            .await
            .unwrap();
        assert_eq!(id, "fixed");

        let err = store
            .insert("users", doc(json!({ "id": "fixed" })))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of("id"));
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicates() {
        let store = MemoryStore::new();
        store.create_unique_index("users", "email").await.unwrap();

        store.insert("users", doc(json!({ "email": "a@x.io" }))).await.unwrap();
        let err = store
            .insert("users", doc(json!({ "email": "a@x.io" })))
            .await
            .unwrap_err();

        assert!(err.is_duplicate_of("email"));
        assert_eq!(store.count("users").await, 1);
    }

    #[tokio::test]
    async fn test_unique_index_on_existing_duplicates_fails() {
        let store = MemoryStore::new();
        store.insert("users", doc(json!({ "email": "a@x.io" }))).await.unwrap();
        store.insert("users", doc(json!({ "email": "a@x.io" }))).await.unwrap();

        assert!(store.create_unique_index("users", "email").await.is_err());
    }

    #[tokio::test]
    async fn test_find_filters_sorts_and_limits() {
        let store = MemoryStore::new();
        for (n, owner) in [(1003, "a"), (1001, "a"), (1002, "b"), (1004, "a")] {
            store
                .insert("patients", doc(json!({ "sequence": n, "created_by": owner })))
                .await
                .unwrap();
        }

        let owned = store
            .find(
                "patients",
                &Filter::new().eq("created_by", "a"),
                FindOptions::sort_by("sequence", SortOrder::Ascending),
            )
            .await
            .unwrap();
        let seqs: Vec<i64> = owned.iter().map(|d| d["sequence"].as_i64().unwrap()).collect();
        assert_eq!(seqs, vec![1001, 1003, 1004]);

        let highest = store
            .find_one(
                "patients",
                &Filter::new(),
                FindOptions::sort_by("sequence", SortOrder::Descending),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(highest["sequence"], 1004);
    }

    #[tokio::test]
    async fn test_find_on_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let docs = store
            .find("nothing", &Filter::new(), FindOptions::default())
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_update_first_match_only() {
        let store = MemoryStore::new();
        store.insert("p", doc(json!({ "k": 1, "v": "a" }))).await.unwrap();
        store.insert("p", doc(json!({ "k": 1, "v": "b" }))).await.unwrap();

        let outcome = store
            .update("p", &Filter::new().eq("k", 1), doc(json!({ "v": "z" })))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let zs = store
            .find("p", &Filter::new().eq("v", "z"), FindOptions::default())
            .await
            .unwrap();
        assert_eq!(zs.len(), 1);
    }

    #[tokio::test]
    async fn test_update_reports_unmodified() {
        let store = MemoryStore::new();
        store.insert("p", doc(json!({ "k": 1, "v": "a" }))).await.unwrap();

        let outcome = store
            .update("p", &Filter::new().eq("k", 1), doc(json!({ "v": "a" })))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 0 });

        let none = store
            .update("p", &Filter::new().eq("k", 2), doc(json!({ "v": "a" })))
            .await
            .unwrap();
        assert_eq!(none.matched, 0);
    }

    #[tokio::test]
    async fn test_update_respects_unique_index() {
        let store = MemoryStore::new();
        store.create_unique_index("users", "email").await.unwrap();
        store.insert("users", doc(json!({ "id": "1", "email": "a@x.io" }))).await.unwrap();
        store.insert("users", doc(json!({ "id": "2", "email": "b@x.io" }))).await.unwrap();

        let err = store
            .update(
                "users",
                &Filter::new().eq("id", "2"),
                doc(json!({ "email": "a@x.io" })),
            )
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of("email"));

        // Re-setting a document's own value is not a conflict
        let ok = store
            .update(
                "users",
                &Filter::new().eq("id", "1"),
                doc(json!({ "email": "a@x.io" })),
            )
            .await
            .unwrap();
        assert_eq!(ok.matched, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.insert("p", doc(json!({ "k": 1 }))).await.unwrap();

        assert_eq!(store.delete("p", &Filter::new().eq("k", 2)).await.unwrap(), 0);
        assert_eq!(store.delete("p", &Filter::new().eq("k", 1)).await.unwrap(), 1);
        assert_eq!(store.delete("p", &Filter::new().eq("k", 1)).await.unwrap(), 0);
        assert_eq!(store.count("p").await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_unique_inserts() {
        let store = Arc::new(MemoryStore::new());
        store.create_unique_index("users", "email").await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert("users", doc(json!({ "email": "same@x.io" })))
                        .await
                        .is_ok()
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.count("users").await, 1);
    }
}
