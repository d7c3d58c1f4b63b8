/// Image upload endpoint
///
/// Accepts a multipart upload and checks that it is an image. Uploaded
/// bytes are read and discarded; every upload gets the same placeholder id.
///
/// # Endpoint
///
/// ```text
/// POST /api/upload-image
/// Content-Type: multipart/form-data; boundary=...
///
/// file=<image bytes>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Image uploaded successfully",
///   "image_id": "img_placeholder_id",
///   "filename": "lumbar-ap.png"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: The file is not an image, or the body is not valid multipart
/// - `422 Unprocessable Entity`: No `file` field

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    Json,
};
use serde::{Deserialize, Serialize};

/// Id returned for every upload
pub const PLACEHOLDER_IMAGE_ID: &str = "img_placeholder_id";

const FILE_FIELD: &str = "file";

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub image_id: String,
    pub filename: Option<String>,
}

/// True for `image/*` content types
fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
}

/// Upload an X-ray or other medical image
pub async fn upload_image(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if !is_image(field.content_type()) {
            return Err(ApiError::BadRequest("File must be an image".to_string()));
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;

        tracing::info!(
            filename = filename.as_deref().unwrap_or("<unnamed>"),
            size = bytes.len(),
            "image uploaded"
        );

        return Ok(Json(UploadResponse {
            success: true,
            message: "Image uploaded successfully".to_string(),
            image_id: PLACEHOLDER_IMAGE_ID.to_string(),
            filename,
        }));
    }

    Err(ApiError::ValidationError(vec![ValidationErrorDetail {
        field: FILE_FIELD.to_string(),
        message: "File is required".to_string(),
    }]))
}
