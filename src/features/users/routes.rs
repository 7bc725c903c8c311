use crate::features::users::handlers::profile_handler;
use crate::features::users::services::UserProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route(
            "/api/users/me",
            get(profile_handler::get_profile).patch(profile_handler::update_profile),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{unreachable_pool, with_test_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn server(authenticated: bool) -> TestServer {
        let router = routes(Arc::new(UserProfileService::new(unreachable_pool())));
        let router = if authenticated {
            with_test_user(router)
        } else {
            router
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_profile_requires_identity() {
        server(false)
            .get("/api/users/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        server(true)
            .patch("/api/users/me")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlong_bio_is_a_field_error() {
        let response = server(true)
            .patch("/api/users/me")
            .json(&json!({ "bio": "meong ".repeat(100) }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(
            body["errors"],
            json!(["bio: Bio must not exceed 500 characters"])
        );
    }
}
