pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::prediction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prediction API
        .route("/api/v1/predictions", post(handlers::handle_predict))
        // Model artifact API
        .route("/api/v1/model", get(handlers::handle_model_info))
        .route("/api/v1/model/reload", post(handlers::handle_model_reload))
        .with_state(state)
}
