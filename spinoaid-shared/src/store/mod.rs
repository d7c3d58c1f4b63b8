/// Document storage layer
///
/// Route handlers never talk to a persistence engine directly. They go through
/// the [`DocumentStore`] trait, which models a small document database:
/// named collections of JSON objects queried by field equality.
///
/// # Implementations
///
/// - [`MockStore`]: accepts every write and finds nothing. Mirrors a
///   deployment with no database attached.
/// - [`MemoryStore`]: in-process collections behind an async `RwLock`, with
///   unique indexes. Used by tests and by default at runtime.
///
/// # Example
///
/// ```
/// use spinoaid_shared::store::{DocumentStore, Filter, FindOptions, MemoryStore};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.create_unique_index("users", "email").await?;
///
/// let doc = json!({ "email": "a@example.com" }).as_object().cloned().unwrap();
/// let id = store.insert("users", doc).await?;
///
/// let found = store
///     .find_one("users", &Filter::new().eq("id", id), FindOptions::default())
///     .await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod mock;

pub use memory::MemoryStore;
pub use mock::MockStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A stored document: a JSON object keyed by field name
pub type Document = Map<String, Value>;

/// Field holding a document's primary key
pub const ID_FIELD: &str = "id";

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write
    #[error("Duplicate value for unique field '{field}' in '{collection}'")]
    Duplicate { collection: String, field: String },

    /// A document could not be converted to or from its typed form
    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if this is a unique index violation on `field`
    pub fn is_duplicate_of(&self, field: &str) -> bool {
        matches!(self, StoreError::Duplicate { field: f, .. } if f == field)
    }
}

/// Equality filter over document fields
///
/// A document matches when every listed field is present and equal.
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Document,
}

impl Filter {
    /// Creates an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality constraint
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Checks whether a document satisfies every constraint
    pub fn matches(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    /// Returns true if the filter has no constraints
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Options for find queries
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Field and direction to sort by
    pub sort: Option<(String, SortOrder)>,

    /// Maximum number of documents to return
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Sorts by `field` in the given direction
    pub fn sort_by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort: Some((field.into(), order)),
            limit: None,
        }
    }

    /// Caps the number of returned documents
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents that matched the filter
    pub matched: u64,

    /// Documents actually changed
    pub modified: u64,
}

/// Storage collaborator used by models and routes
///
/// Every operation names its collection. Update and delete act on the first
/// document matching the filter, in insertion order unless the backend says
/// otherwise.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for health output and logs
    fn backend(&self) -> &'static str;

    /// Declares that `field` must be unique within `collection`
    async fn create_unique_index(&self, collection: &str, field: &str) -> StoreResult<()>;

    /// Returns every matching document
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Returns the first matching document, honoring the sort option
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Option<Document>>;

    /// Inserts a document and returns its id
    ///
    /// A missing `id` field is filled with a fresh UUID.
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<String>;

    /// Sets the given fields on the first matching document
    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> StoreResult<UpdateOutcome>;

    /// Deletes the first matching document and returns how many were removed
    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}

/// Converts a typed value into a stored document
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Backend(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Converts a stored document into a typed value
pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Orders two field values for sorting
///
/// Numbers compare numerically, RFC 3339 timestamps chronologically, other
/// strings lexically. Missing values sort first.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                chrono::DateTime::parse_from_rfc3339(x),
                chrono::DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
