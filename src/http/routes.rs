use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/egress/start", post(handlers::start_egress))
        .route("/egress/stop", post(handlers::stop_egress))
        .route("/egress/list", get(handlers::list_egresses))
        .route("/egress/active", get(handlers::active_egresses))
        // Stored recordings
        .route("/list", get(handlers::list_files))
        .route("/get_file_url", get(handlers::get_file_url))
        // Local recordings
        .route("/recordings", get(handlers::list_local_recordings))
        .route(
            "/recordings/:recording_id",
            get(handlers::get_local_recording),
        )
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
