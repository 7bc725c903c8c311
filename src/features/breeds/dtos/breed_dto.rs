use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BreedSuggestionResponseDto {
    /// Candidate breeds, most likely first; empty when the photo could not be identified
    pub suggestions: Vec<String>,
}

/// Multipart body of `POST /api/breeds/suggest`, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SuggestBreedForm {
    /// Photo of the cat (jpeg, png, webp; max 5MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}
