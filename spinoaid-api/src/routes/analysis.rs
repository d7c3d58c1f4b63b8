/// Image analysis endpoint
///
/// Passes the request body to the configured [`ImageAnalyzer`] and returns
/// its predictions.
///
/// [`ImageAnalyzer`]: spinoaid_shared::inference::ImageAnalyzer
///
/// # Endpoint
///
/// ```text
/// POST /api/analyze
/// Content-Type: application/json
///
/// { "image_id": "img_placeholder_id" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Analysis complete",
///   "predictions": [
///     {
///       "label": "Example Finding",
///       "confidence": 0.95,
///       "region": { "x": 100, "y": 100, "width": 50, "height": 50 }
///     }
///   ]
/// }
/// ```

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use spinoaid_shared::inference::Prediction;

/// Analysis response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub message: String,
    pub predictions: Vec<Prediction>,
}

/// Run the analyzer over an uploaded image
///
/// The body must be a JSON object; its contents are up to the analyzer.
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<Map<String, JsonValue>>,
) -> ApiResult<Json<AnalysisResponse>> {
    let request = JsonValue::Object(request);
    let predictions = state.analyzer.analyze(&request).await?;

    tracing::debug!(
        analyzer = state.analyzer.name(),
        predictions = predictions.len(),
        "analysis complete"
    );

    Ok(Json(AnalysisResponse {
        success: true,
        message: "Analysis complete".to_string(),
        predictions,
    }))
}
