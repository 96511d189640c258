pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::email::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Email API
        .route("/api/v1/tones", get(handlers::handle_list_tones))
        .route("/api/v1/emails/generate", post(handlers::handle_generate))
        .route("/api/v1/emails/signals", post(handlers::handle_signals))
        .fallback(not_found)
        .with_state(state)
}
