use async_trait::async_trait;
use base64::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::GeminiConfig;
use crate::core::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One piece of a multimodal prompt
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 encoded bytes
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn image(mime_type: &str, bytes: &[u8]) -> Self {
        Part::InlineData(InlineData {
            mime_type: mime_type.to_string(),
            data: BASE64_STANDARD.encode(bytes),
        })
    }
}

/// A model that turns a multimodal prompt into text
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_text(&self, parts: Vec<Part>) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String, AppError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::ExternalServiceError(format!(
                "Gemini blocked the prompt: {}",
                reason
            )));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::ExternalServiceError(
                "No text in Gemini response".to_string(),
            ));
        }
        Ok(text)
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// `None` when no API key is configured
    pub fn new(config: &GeminiConfig) -> Result<Option<Self>, AppError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(&self, parts: Vec<Part>) -> Result<String, AppError> {
        let body = GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Gemini request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Gemini returned {}: {}",
                status,
                text.chars().take(300).collect::<String>()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Invalid Gemini response: {}", e))
        })?;

        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::text("Describe"), Part::image("image/png", b"abc")],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Describe");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "YWJj");
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[\"Persian\","},{"text":" \"Anggora\"]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), r#"["Persian", "Anggora"]"#);
    }

    #[test]
    fn test_blocked_or_empty_response_is_an_error() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(
            blocked.into_text(),
            Err(AppError::ExternalServiceError(msg)) if msg.contains("SAFETY")
        ));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn test_missing_key_disables_client() {
        let config = GeminiConfig {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        };
        assert!(GeminiClient::new(&config).unwrap().is_none());

        let config = GeminiConfig {
            api_key: Some("key".to_string()),
            ..config
        };
        let client = GeminiClient::new(&config).unwrap().unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
