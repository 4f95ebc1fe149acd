//! Axum route handlers for the Prediction API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::prediction::adjust::RoleScore;
use crate::prediction::features::{CandidateInput, FEATURE_COUNT};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Ranked recommendations, descending confidence, summing to 100.
    pub top_roles: Vec<RoleScore>,
    pub model_version: String,
    pub predicted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub version: String,
    pub artifact_path: String,
    pub feature_count: usize,
    pub roles: Vec<String>,
    pub degrees: Vec<String>,
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub version: String,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/predictions
///
/// Runs the full pipeline for one candidate profile. Unknown categories and
/// malformed numerics degrade to their documented fallbacks instead of
/// failing; the only error path is an unavailable artifact bundle.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(input): Json<CandidateInput>,
) -> Result<Json<PredictResponse>, AppError> {
    let bundle = state.predictor.bundle()?;
    let top_roles = state.predictor.predict(&input)?;

    Ok(Json(PredictResponse {
        top_roles,
        model_version: bundle.version.clone(),
        predicted_at: Utc::now(),
    }))
}

/// GET /api/v1/model
///
/// Artifact metadata: version and the category/role vocabularies the model
/// was trained on. Loads the bundle lazily like any prediction would.
pub async fn handle_model_info(
    State(state): State<AppState>,
) -> Result<Json<ModelInfoResponse>, AppError> {
    let bundle = state.predictor.bundle()?;

    Ok(Json(ModelInfoResponse {
        version: bundle.version.clone(),
        artifact_path: state.config.artifact_path.display().to_string(),
        feature_count: FEATURE_COUNT,
        roles: bundle.role_encoder.classes().to_vec(),
        degrees: bundle.degree_encoder.classes().to_vec(),
        fields: bundle.field_encoder.classes().to_vec(),
    }))
}

/// POST /api/v1/model/reload
///
/// Re-reads the artifact path and atomically swaps the bundle. In-flight
/// predictions finish on the bundle they started with; a failed reload
/// leaves the previous bundle in service and reports the load error.
pub async fn handle_model_reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let bundle = state.predictor.reload()?;

    Ok(Json(ReloadResponse {
        version: bundle.version.clone(),
        message: "Model artifact reloaded".to_string(),
    }))
}
