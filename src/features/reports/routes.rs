use axum::{
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Public report routes: browsing and detail
pub fn public_routes(state: ReportState) -> Router {
    Router::new()
        .route("/api/reports", get(handlers::list_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .with_state(state)
}

/// Report routes that need a verified identity
///
/// Ownership is checked per operation by the service.
pub fn protected_routes(state: ReportState) -> Router {
    Router::new()
        .route("/api/reports", post(handlers::create_report))
        .route(
            "/api/reports/{id}",
            axum::routing::put(handlers::update_report).delete(handlers::delete_report),
        )
        .route(
            "/api/reports/{id}/status",
            axum::routing::patch(handlers::update_report_status),
        )
        .route("/api/reports/{id}/images", post(handlers::add_report_images))
        .route("/api/users/me/reports", get(handlers::list_my_reports))
        .with_state(state)
}
