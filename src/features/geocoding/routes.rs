use crate::features::geocoding::handlers;
use crate::features::geocoding::services::GeocodingService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<GeocodingService>) -> Router {
    Router::new()
        .route("/api/geocode/reverse", get(handlers::reverse_geocode))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GeocodingConfig;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn server() -> TestServer {
        let service = GeocodingService::new(&GeocodingConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            user_agent: "JejakMeong/test".to_string(),
            accept_language: "id".to_string(),
        })
        .unwrap();
        TestServer::new(routes(Arc::new(service))).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_falls_back_to_coordinates() {
        let response = server()
            .get("/api/geocode/reverse")
            .add_query_param("lat", -6.1966)
            .add_query_param("lon", 106.8317)
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["resolved"], false);
        assert_eq!(body["data"]["location_text"], "-6.196600, 106.831700");
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_are_rejected() {
        let response = server()
            .get("/api/geocode/reverse")
            .add_query_param("lat", 91)
            .add_query_param("lon", 0)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(
            body["errors"],
            serde_json::json!(["lat: Latitude must be between -90 and 90"])
        );
    }

    #[tokio::test]
    async fn test_missing_coordinates_are_rejected() {
        server()
            .get("/api/geocode/reverse")
            .add_query_param("lat", 1)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
