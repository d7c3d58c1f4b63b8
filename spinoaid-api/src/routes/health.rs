/// Liveness and health check endpoints
///
/// # Endpoints
///
/// ```text
/// GET /
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "message": "All systems operational",
///   "version": "2.0.0",
///   "storage": "memory"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Root response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    pub message: String,

    /// Application version
    pub version: String,

    /// Storage backend in use
    pub storage: String,
}

/// Root handler
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "SpinoAid API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check handler
///
/// Reports the service version and which storage backend is serving.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "All systems operational".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.store.backend().to_string(),
    })
}
