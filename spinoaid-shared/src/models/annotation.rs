/// Annotation records
///
/// One record is a batch of shapes drawn on one image of one patient, saved
/// together. Shapes are opaque to the backend beyond their structure: the
/// `type` string is whatever the drawing tool emits.
///
/// Records are owned by their creator and listed newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{
    from_document, to_document, DocumentStore, Filter, FindOptions, SortOrder, StoreResult,
    ID_FIELD,
};

fn default_stroke_width() -> Option<f64> {
    Some(2.0)
}

/// A point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One drawn shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Client-side shape id
    pub id: String,

    /// Shape kind as named by the client (`rectangle`, `line`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    pub points: Vec<Point>,

    pub color: String,

    #[serde(rename = "strokeWidth", default = "default_stroke_width")]
    pub stroke_width: Option<f64>,

    #[serde(default)]
    pub text: Option<String>,
}

/// Stored annotation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: Uuid,

    /// Code of the annotated patient
    pub patient_id: String,

    pub image_name: String,

    pub annotations: Vec<Shape>,

    /// Owning user
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Input for saving a batch of shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnotationRecord {
    pub patient_id: String,
    pub image_name: String,
    pub annotations: Vec<Shape>,
}

impl AnnotationRecord {
    /// Collection name
    pub const COLLECTION: &'static str = "annotations";

    /// Saves a batch owned by `owner`
    pub async fn create(
        store: &dyn DocumentStore,
        owner: Uuid,
        data: CreateAnnotationRecord,
    ) -> StoreResult<Self> {
        let record = AnnotationRecord {
            id: Uuid::new_v4(),
            patient_id: data.patient_id,
            image_name: data.image_name,
            annotations: data.annotations,
            created_by: owner,
            created_at: Utc::now(),
        };

        store
            .insert(Self::COLLECTION, to_document(&record)?)
            .await?;

        tracing::debug!(
            record_id = %record.id,
            patient_id = %record.patient_id,
            shapes = record.annotations.len(),
            "saved annotations"
        );

        Ok(record)
    }

    /// Lists the owner's records for a patient, newest first
    pub async fn list_for_patient(
        store: &dyn DocumentStore,
        owner: Uuid,
        patient_id: &str,
    ) -> StoreResult<Vec<Self>> {
        let filter = Filter::new()
            .eq("patient_id", patient_id)
            .eq("created_by", owner.to_string());

        store
            .find(
                Self::COLLECTION,
                &filter,
                FindOptions::sort_by("created_at", SortOrder::Descending),
            )
            .await?
            .into_iter()
            .map(from_document::<Self>)
            .collect()
    }

    /// Deletes one of the owner's records, returning whether it existed
    pub async fn delete_for_owner(
        store: &dyn DocumentStore,
        owner: Uuid,
        id: Uuid,
    ) -> StoreResult<bool> {
        let filter = Filter::new()
            .eq(ID_FIELD, id.to_string())
            .eq("created_by", owner.to_string());

        Ok(store.delete(Self::COLLECTION, &filter).await? > 0)
    }
}
