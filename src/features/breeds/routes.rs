use crate::features::breeds::handlers;
use crate::features::breeds::services::BreedService;
use axum::{routing::post, Router};
use std::sync::Arc;

pub fn routes(service: Arc<BreedService>) -> Router {
    Router::new()
        .route("/api/breeds/suggest", post(handlers::suggest_breeds))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::modules::gemini::{GenerativeModel, Part};
    use crate::shared::test_helpers::with_test_user;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part as FormPart};
    use axum_test::TestServer;

    /// Describes every photo the same way and answers with a fixed list
    struct FixedModel(&'static str);

    #[async_trait]
    impl GenerativeModel for FixedModel {
        async fn generate_text(&self, parts: Vec<Part>) -> Result<String, AppError> {
            if parts.iter().any(|p| matches!(p, Part::InlineData(_))) {
                Ok(r#"{"features": "orange tabby"}"#.to_string())
            } else {
                Ok(self.0.to_string())
            }
        }
    }

    fn server(answer: Option<&'static str>) -> TestServer {
        let model = answer.map(|a| Arc::new(FixedModel(a)) as Arc<dyn GenerativeModel>);
        let router = routes(Arc::new(BreedService::new(model)));
        TestServer::new(with_test_user(router)).unwrap()
    }

    fn photo_form() -> MultipartForm {
        MultipartForm::new().add_part(
            "image",
            FormPart::bytes(vec![0xff, 0xd8, 0xff])
                .file_name("oyen.jpg")
                .mime_type("image/jpeg"),
        )
    }

    #[tokio::test]
    async fn test_suggestions_are_returned() {
        let response = server(Some(r#"["Domestic Shorthair", "Bengal"]"#))
            .post("/api/breeds/suggest")
            .multipart(photo_form())
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(
            body["data"]["suggestions"],
            serde_json::json!(["Domestic Shorthair", "Bengal"])
        );
        assert!(body["message"].is_null());
    }

    #[tokio::test]
    async fn test_empty_list_carries_manual_entry_message() {
        let response = server(Some("[]"))
            .post("/api/breeds/suggest")
            .multipart(photo_form())
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["suggestions"], serde_json::json!([]));
        assert_eq!(
            body["message"],
            "Could not identify breed. Please enter manually."
        );
    }

    #[tokio::test]
    async fn test_missing_image() {
        let response = server(Some("[]"))
            .post("/api/breeds/suggest")
            .multipart(MultipartForm::new().add_text("note", "no photo"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Please select an image first.");
    }

    #[tokio::test]
    async fn test_unconfigured_model_is_unavailable() {
        server(None)
            .post("/api/breeds/suggest")
            .multipart(photo_form())
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}
