pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/screen", post(handlers::handle_screen))
        .route("/api/v1/rank", post(handlers::handle_rank))
        // Parsing API (requires ANTHROPIC_API_KEY)
        .route("/api/v1/parse/resume", post(handlers::handle_parse_resume))
        .route("/api/v1/parse/job", post(handlers::handle_parse_job))
        .with_state(state)
}
