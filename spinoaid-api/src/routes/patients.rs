/// Patient record endpoints
///
/// All endpoints require JWT authentication and only ever see the caller's
/// own patients. A patient owned by someone else is reported as not found.
///
/// # Endpoints
///
/// - `GET /api/patients` - List the caller's patients
/// - `POST /api/patients` - Create a patient with the next `P-<n>` code
/// - `GET /api/patients/:patient_id` - Fetch one patient by code
/// - `PUT /api/patients/:patient_id` - Partial update
/// - `DELETE /api/patients/:patient_id` - Delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use spinoaid_shared::{
    auth::middleware::AuthContext,
    models::patient::{CreatePatient, Patient, UpdatePatient},
};

const NOT_FOUND: &str = "Patient not found";

/// List response
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientListResponse {
    pub success: bool,
    pub patients: Vec<Patient>,
}

/// Single patient response
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientResponse {
    pub success: bool,
    pub patient: Patient,
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// List the caller's patients
///
/// # Response
///
/// ```json
/// { "success": true, "patients": [ { "patient_id": "P-1001", ... } ] }
/// ```
pub async fn list_patients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PatientListResponse>> {
    let patients = Patient::list_for_owner(&*state.store, auth.user_id).await?;

    Ok(Json(PatientListResponse {
        success: true,
        patients,
    }))
}

/// Create a patient
///
/// # Endpoint
///
/// ```text
/// POST /api/patients
/// Authorization: Bearer <token>
///
/// {
///   "name": "John Smith",
///   "age": 54,
///   "gender": "male",
///   "allergies": ["penicillin"]
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "patient": { "patient_id": "P-1001", "name": "John Smith", ... } }
/// ```
pub async fn create_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreatePatient>,
) -> ApiResult<Json<PatientResponse>> {
    let patient = Patient::create(&*state.store, auth.user_id, req).await?;

    tracing::info!(
        patient_id = %patient.patient_id,
        owner = %auth.user_id,
        "patient created"
    );

    Ok(Json(PatientResponse {
        success: true,
        patient,
    }))
}

/// Fetch one patient by code
///
/// # Errors
///
/// - `404 Not Found`: No such patient for this caller
pub async fn get_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(patient_id): ApiPath<String>,
) -> ApiResult<Json<PatientResponse>> {
    let patient = Patient::find_for_owner(&*state.store, auth.user_id, &patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(PatientResponse {
        success: true,
        patient,
    }))
}

/// Partially update a patient
///
/// Only fields present (and not null) in the body are written.
///
/// # Errors
///
/// - `400 Bad Request`: The body sets no fields
/// - `404 Not Found`: No such patient for this caller
pub async fn update_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(patient_id): ApiPath<String>,
    ApiJson(changes): ApiJson<UpdatePatient>,
) -> ApiResult<Json<PatientResponse>> {
    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let patient = Patient::update_for_owner(&*state.store, auth.user_id, &patient_id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(PatientResponse {
        success: true,
        patient,
    }))
}

/// Delete a patient
///
/// # Errors
///
/// - `404 Not Found`: No such patient for this caller
pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(patient_id): ApiPath<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if !Patient::delete_for_owner(&*state.store, auth.user_id, &patient_id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    tracing::info!(%patient_id, owner = %auth.user_id, "patient deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Patient deleted".to_string(),
    }))
}
