use crate::features::auth::handler;
use axum::{routing::get, Router};

/// Protected auth routes (require a verified ID token)
pub fn protected_routes() -> Router {
    Router::new().route("/api/auth/me", get(handler::get_me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_user, with_test_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_me_requires_identity() {
        let server = TestServer::new(protected_routes()).unwrap();
        let response = server.get("/api/auth/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_echoes_identity() {
        let server = TestServer::new(with_test_user(protected_routes())).unwrap();
        let response = server.get("/api/auth/me").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["sub"], test_user().sub);
    }
}
