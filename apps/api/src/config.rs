use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; a wrong artifact path surfaces as a 503
/// on first use, not at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Versioned artifact bundle produced by the offline training job.
    pub artifact_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            artifact_path: std::env::var("MODEL_ARTIFACT_PATH")
                .unwrap_or_else(|_| "ml/career_model.json".to_string())
                .into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
