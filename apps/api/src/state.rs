use std::sync::Arc;

use crate::config::Config;
use crate::prediction::pipeline::CareerPredictor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The prediction pipeline over the process-wide cached artifact bundle.
    pub predictor: Arc<CareerPredictor>,
}
