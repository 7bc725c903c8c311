use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::comments::handlers::{self, CommentState};

pub fn public_routes(state: CommentState) -> Router {
    Router::new()
        .route("/api/reports/{id}/comments", get(handlers::list_comments))
        .with_state(state)
}

pub fn protected_routes(state: CommentState) -> Router {
    Router::new()
        .route("/api/reports/{id}/comments", post(handlers::create_comment))
        .route(
            "/api/reports/{id}/comments/{comment_id}",
            delete(handlers::delete_comment),
        )
        .with_state(state)
}
