/// Stored entities and their queries
///
/// Each model exposes associated functions that take the storage collaborator
/// as their first argument, so the same code runs against any
/// [`DocumentStore`](crate::store::DocumentStore).
///
/// # Models
///
/// - `user`: accounts and credentials
/// - `patient`: owner-scoped patient records with sequential codes
/// - `annotation`: owner-scoped batches of shapes drawn on patient images

pub mod annotation;
pub mod patient;
pub mod user;

use crate::store::{DocumentStore, StoreResult};

/// Creates the unique indexes the models rely on
///
/// Call once at startup, before serving requests.
pub async fn ensure_indexes(store: &dyn DocumentStore) -> StoreResult<()> {
    store
        .create_unique_index(user::User::COLLECTION, "email")
        .await?;
    store
        .create_unique_index(patient::Patient::COLLECTION, "patient_id")
        .await?;
    Ok(())
}
