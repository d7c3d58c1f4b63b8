/// Image analysis seam
///
/// `/api/analyze` hands its request body to an [`ImageAnalyzer`]. The only
/// implementation today is [`PlaceholderAnalyzer`], which ignores its input
/// and returns one fixed finding. A real model plugs in by implementing the
/// trait and being passed to the application state at startup.
///
/// # Example
///
/// ```
/// use spinoaid_shared::inference::{ImageAnalyzer, PlaceholderAnalyzer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = PlaceholderAnalyzer::new();
/// let predictions = analyzer.analyze(&serde_json::json!({ "image_id": "img_1" })).await?;
/// assert_eq!(predictions[0].label, "Example Finding");
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Error type for analysis
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The request did not describe an image the analyzer can use
    #[error("Invalid analysis request: {0}")]
    InvalidRequest(String),

    /// The model failed
    #[error("Model execution failed: {0}")]
    ModelFailed(String),
}

/// Bounding box in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One finding reported by the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    pub region: Region,
}

/// Runs a model over an uploaded image
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Analyzer name for logs
    fn name(&self) -> &str;

    /// Analyzes the image described by `request`
    async fn analyze(&self, request: &JsonValue) -> Result<Vec<Prediction>, InferenceError>;
}

/// Analyzer that returns a fixed example finding
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAnalyzer;

impl PlaceholderAnalyzer {
    pub fn new() -> Self {
        PlaceholderAnalyzer
    }
}

#[async_trait]
impl ImageAnalyzer for PlaceholderAnalyzer {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn analyze(&self, _request: &JsonValue) -> Result<Vec<Prediction>, InferenceError> {
        Ok(vec![Prediction {
            label: "Example Finding".to_string(),
            confidence: 0.95,
            region: Region {
                x: 100,
                y: 100,
                width: 50,
                height: 50,
            },
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_placeholder_ignores_input() {
        let analyzer = PlaceholderAnalyzer::new();

        let a = analyzer.analyze(&json!({})).await.unwrap();
        let b = analyzer.analyze(&json!({ "image_id": "xyz" })).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].confidence, 0.95);
        assert_eq!(
            serde_json::to_value(&a[0].region).unwrap(),
            json!({ "x": 100, "y": 100, "width": 50, "height": 50 })
        );
    }
}
