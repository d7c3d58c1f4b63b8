/// Request extractors that reject with [`ApiError`]
///
/// Axum's own `Json` and `Path` extractors answer malformed input with a
/// plain-text body. These wrappers run the same extraction and convert the
/// rejection into an [`ApiError`], so every error reaches the client in the
/// `{error, message, details?}` shape.
///
/// # Example
///
/// ```
/// use spinoaid_api::extract::{ApiJson, ApiPath};
///
/// async fn handler(ApiPath(id): ApiPath<String>, ApiJson(body): ApiJson<serde_json::Value>) {
///     let _ = (id, body);
/// }
/// ```

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
