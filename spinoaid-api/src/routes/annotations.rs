/// Annotation endpoints
///
/// Save, list and delete batches of shapes drawn on patient images. All
/// endpoints require JWT authentication and are scoped to the caller.
///
/// `GET` and `DELETE` share the `/api/annotations/:id` path: for `GET` the
/// segment is a patient code, for `DELETE` it is an annotation record id.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::patients::DeleteResponse,
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use spinoaid_shared::{
    auth::middleware::AuthContext,
    models::annotation::{AnnotationRecord, CreateAnnotationRecord},
};
use uuid::Uuid;

const NOT_FOUND: &str = "Annotation record not found";

/// Save response
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveAnnotationsResponse {
    pub success: bool,
    pub message: String,

    /// Id of the stored record
    pub id: String,
}

/// List response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotationListResponse {
    pub success: bool,
    pub records: Vec<AnnotationRecord>,
}

/// Save a batch of shapes
///
/// # Endpoint
///
/// ```text
/// POST /api/annotations
/// Authorization: Bearer <token>
///
/// {
///   "patient_id": "P-1001",
///   "image_name": "lumbar-ap.png",
///   "annotations": [
///     { "id": "s1", "type": "line", "points": [{"x": 1, "y": 2}], "color": "#f00" }
///   ]
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Saved 1 annotations", "id": "uuid" }
/// ```
pub async fn save_annotations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateAnnotationRecord>,
) -> ApiResult<Json<SaveAnnotationsResponse>> {
    let record = AnnotationRecord::create(&*state.store, auth.user_id, req).await?;

    Ok(Json(SaveAnnotationsResponse {
        success: true,
        message: format!("Saved {} annotations", record.annotations.len()),
        id: record.id.to_string(),
    }))
}

/// List the caller's records for a patient, newest first
///
/// An unknown patient yields an empty list.
pub async fn list_annotations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(patient_id): ApiPath<String>,
) -> ApiResult<Json<AnnotationListResponse>> {
    let records =
        AnnotationRecord::list_for_patient(&*state.store, auth.user_id, &patient_id).await?;

    Ok(Json(AnnotationListResponse {
        success: true,
        records,
    }))
}

/// Delete one of the caller's records
///
/// # Errors
///
/// - `404 Not Found`: No such record for this caller, or a malformed id
pub async fn delete_annotation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let record_id =
        Uuid::parse_str(&id).map_err(|_| ApiError::NotFound(NOT_FOUND.to_string()))?;

    if !AnnotationRecord::delete_for_owner(&*state.store, auth.user_id, record_id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Annotation deleted".to_string(),
    }))
}
