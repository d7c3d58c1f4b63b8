/// User accounts
///
/// Stored in the `users` collection. Emails are unique (enforced by a unique
/// index, see [`crate::models::ensure_indexes`]) and compared
/// case-insensitively: they are trimmed and lowercased before every write and
/// lookup.
///
/// # Example
///
/// ```
/// use spinoaid_shared::models::user::{CreateUser, User};
/// use spinoaid_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let user = User::create(
///     &store,
///     CreateUser {
///         name: "Dr. Okafor".to_string(),
///         email: "Okafor@Clinic.test".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&store, "okafor@clinic.test").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{
    from_document, to_document, DocumentStore, Filter, FindOptions, StoreResult, ID_FIELD,
};

/// User model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Normalized email address
    pub email: String,

    /// Argon2id PHC string, never the plaintext
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Collection name
    pub const COLLECTION: &'static str = "users";

    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// `StoreError::Duplicate` on the `email` field if the address is taken.
    pub async fn create(store: &dyn DocumentStore, data: CreateUser) -> StoreResult<Self> {
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: normalize_email(&data.email),
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };

        store.insert(Self::COLLECTION, to_document(&user)?).await?;
        tracing::debug!(user_id = %user.id, "created user");

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(store: &dyn DocumentStore, id: Uuid) -> StoreResult<Option<Self>> {
        let filter = Filter::new().eq(ID_FIELD, id.to_string());
        Self::find_one(store, &filter).await
    }

    /// Finds a user by email, ignoring case and surrounding whitespace
    pub async fn find_by_email(
        store: &dyn DocumentStore,
        email: &str,
    ) -> StoreResult<Option<Self>> {
        let filter = Filter::new().eq("email", normalize_email(email));
        Self::find_one(store, &filter).await
    }

    async fn find_one(store: &dyn DocumentStore, filter: &Filter) -> StoreResult<Option<Self>> {
        store
            .find_one(Self::COLLECTION, filter, FindOptions::default())
            .await?
            .map(from_document::<Self>)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockStore};

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();
        let user = User::create(&store, new_user("ana@example.com")).await.unwrap();

        let by_id = User::find_by_id(&store, user.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&user));

        let by_email = User::find_by_email(&store, "ANA@example.com").await.unwrap();
        assert_eq!(by_email, Some(user));

        assert!(User::find_by_id(&store, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_index() {
        let store = MemoryStore::new();
        crate::models::ensure_indexes(&store).await.unwrap();

        User::create(&store, new_user("dup@example.com")).await.unwrap();
        let err = User::create(&store, new_user("Dup@Example.com")).await.unwrap_err();

        assert!(err.is_duplicate_of("email"));
    }

    #[tokio::test]
    async fn test_mock_store_never_finds_users() {
        let user = User::create(&MockStore, new_user("ghost@example.com")).await.unwrap();
        assert!(User::find_by_id(&MockStore, user.id).await.unwrap().is_none());
    }
}
