use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::ImageUpload;
use crate::modules::gemini::{GenerativeModel, Part};
use crate::shared::llm::{parse_string_list, parse_with_fallback, LlmResponse};
use crate::shared::prompts::{render_breed_features_prompt, render_breed_suggest_prompt};

pub const NO_BREED_MESSAGE: &str = "Could not identify breed. Please enter manually.";

const DEFAULT_MAX_SUGGESTIONS: usize = 5;

fn default_true() -> bool {
    true
}

/// Output of the first step: a free-text description of the cat
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BreedFeatures {
    /// Fur length, colour pattern, face and ear shape, body size
    pub features: String,

    #[serde(default = "default_true")]
    #[schemars(skip)]
    pub is_llm_success: bool,

    #[serde(default)]
    #[schemars(skip)]
    pub llm_error_message: Option<String>,
}

impl LlmResponse for BreedFeatures {
    fn mark_as_fallback(&mut self, error_message: String) {
        self.is_llm_success = false;
        self.llm_error_message = Some(error_message);
    }

    fn is_success(&self) -> bool {
        self.is_llm_success && !self.features.trim().is_empty()
    }
}

/// Two-step breed suggestion from a photo
///
/// The model first describes the cat, then names breeds matching the
/// description. Unusable model output yields an empty list, not an error.
pub struct BreedService {
    model: Option<Arc<dyn GenerativeModel>>,
    max_suggestions: usize,
}

impl BreedService {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        Self {
            model,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub async fn suggest(&self, image: &ImageUpload) -> Result<Vec<String>> {
        let model = self.model.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Breed suggestion is not available.".to_string())
        })?;

        let Some(features) = self.describe(&**model, image).await? else {
            return Ok(Vec::new());
        };
        tracing::debug!("Breed features for '{}': {}", image.file_name, features);

        let prompt = render_breed_suggest_prompt(&features, self.max_suggestions)
            .map_err(|e| AppError::Internal(format!("Failed to render breed prompt: {}", e)))?;
        let text = model
            .generate_text(vec![Part::text(prompt)])
            .await
            .map_err(model_failure)?;

        match parse_string_list(&text) {
            Ok(mut breeds) => {
                breeds.truncate(self.max_suggestions);
                tracing::info!("Suggested {} breed(s) for '{}'", breeds.len(), image.file_name);
                Ok(breeds)
            }
            Err(e) => {
                tracing::warn!("Unusable breed list from model: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// First step; `None` when the model gave no usable description
    async fn describe(
        &self,
        model: &dyn GenerativeModel,
        image: &ImageUpload,
    ) -> Result<Option<String>> {
        let prompt = render_breed_features_prompt(&BreedFeatures::json_schema_string())
            .map_err(|e| AppError::Internal(format!("Failed to render features prompt: {}", e)))?;

        let text = model
            .generate_text(vec![
                Part::text(prompt),
                Part::image(&image.content_type, &image.data),
            ])
            .await
            .map_err(model_failure)?;

        let parsed: BreedFeatures = parse_with_fallback(&text);
        if parsed.is_success() {
            Ok(Some(parsed.features.trim().to_string()))
        } else {
            tracing::warn!(
                "No usable breed features: {}",
                parsed.llm_error_message.as_deref().unwrap_or("empty description")
            );
            Ok(None)
        }
    }
}

fn model_failure(e: AppError) -> AppError {
    tracing::error!("Breed suggestion model call failed: {}", e);
    AppError::ExternalServiceError("An error occurred while suggesting breeds.".to_string())
}
