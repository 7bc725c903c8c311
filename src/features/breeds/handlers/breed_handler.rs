use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::breeds::dtos::{BreedSuggestionResponseDto, SuggestBreedForm};
use crate::features::breeds::services::{BreedService, NO_BREED_MESSAGE};
use crate::features::reports::dtos::ImageUpload;
use crate::shared::types::ApiResponse;

const NO_IMAGE_MESSAGE: &str = "Please select an image first.";

/// Suggest breeds for a cat photo
///
/// Accepts multipart/form-data with a single `image` part. When the cat
/// cannot be identified the list is empty and `message` says so.
#[utoipa::path(
    post,
    path = "/api/breeds/suggest",
    request_body(
        content = SuggestBreedForm,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Breed suggestions (possibly empty)", body = ApiResponse<BreedSuggestionResponseDto>),
        (status = 400, description = "No image or unsupported image"),
        (status = 401, description = "Authentication required"),
        (status = 502, description = "Model call failed"),
        (status = 503, description = "Breed suggestion not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "breeds"
)]
pub async fn suggest_breeds(
    user: AuthenticatedUser,
    State(service): State<Arc<BreedService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BreedSuggestionResponseDto>>> {
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let data = field.bytes().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read image data: {}", e))
        })?;

        image = Some(ImageUpload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let image = image
        .filter(|image| !image.data.is_empty())
        .ok_or_else(|| AppError::BadRequest(NO_IMAGE_MESSAGE.to_string()))?;
    image
        .check()
        .map_err(|e| AppError::InvalidFields(vec![e.replacen("images:", "image:", 1)]))?;

    debug!("Breed suggestion requested by {}", user.sub);
    let suggestions = service.suggest(&image).await?;
    let message = suggestions
        .is_empty()
        .then(|| NO_BREED_MESSAGE.to_string());

    Ok(Json(ApiResponse::success(
        Some(BreedSuggestionResponseDto { suggestions }),
        message,
        None,
    )))
}
