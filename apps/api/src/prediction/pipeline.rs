//! Pipeline orchestration: encoder, feature builder, classifier, and
//! confidence adjuster composed behind a single `predict` call, over a
//! process-wide cached artifact bundle.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::prediction::adjust::{adjust, RoleScore};
use crate::prediction::artifact::{ArtifactError, ModelArtifactBundle};
use crate::prediction::encoder::CategoryEncoder;
use crate::prediction::features::{build_features, CandidateInput};
use crate::prediction::forest::Classifier;

// ────────────────────────────────────────────────────────────────────────────
// Model store
// ────────────────────────────────────────────────────────────────────────────

/// Holds the process-wide artifact bundle: loaded lazily on first use,
/// shared read-only behind `Arc`, replaced only by [`ModelStore::reload`].
///
/// Readers clone the `Arc` and drop the lock before running inference, so
/// in-flight predictions keep the bundle they started with even across a
/// reload. Concurrent first-use loads may each read the file; the first
/// writer wins and duplicates are discarded, which is fine because the load
/// is pure and idempotent.
pub struct ModelStore {
    path: PathBuf,
    bundle: RwLock<Option<Arc<ModelArtifactBundle>>>,
}

impl ModelStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            bundle: RwLock::new(None),
        }
    }

    pub fn artifact_path(&self) -> &std::path::Path {
        &self.path
    }

    /// The cached bundle, loading it on first use. Failures are returned to
    /// the caller and nothing is cached, so the next call retries only
    /// because the caller asked again.
    pub fn bundle(&self) -> Result<Arc<ModelArtifactBundle>, ArtifactError> {
        if let Some(bundle) = self.bundle.read().unwrap_or_else(|e| e.into_inner()).clone() {
            return Ok(bundle);
        }

        let loaded = Arc::new(ModelArtifactBundle::load(&self.path)?);

        let mut slot = self.bundle.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = slot.clone() {
            // Lost the load race; the winner's bundle is already in service.
            return Ok(existing);
        }
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Whether a bundle is currently cached. A readiness probe only; does
    /// not trigger a load.
    pub fn is_loaded(&self) -> bool {
        self.bundle
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Loads a fresh bundle from the artifact path and atomically swaps it
    /// in. On failure the previous bundle stays in service untouched.
    pub fn reload(&self) -> Result<Arc<ModelArtifactBundle>, ArtifactError> {
        let loaded = Arc::new(ModelArtifactBundle::load(&self.path)?);
        let mut slot = self.bundle.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&loaded));
        info!(version = %loaded.version, "model artifact swapped in");
        Ok(loaded)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prediction pipeline
// ────────────────────────────────────────────────────────────────────────────

/// One inference pass: encode, build features, classify, adjust. Pure given
/// its inputs; every step is in-memory and O(classes x tree depth).
pub fn run_pipeline(
    classifier: &dyn Classifier,
    degree_encoder: &CategoryEncoder,
    field_encoder: &CategoryEncoder,
    role_encoder: &CategoryEncoder,
    input: &CandidateInput,
) -> Vec<RoleScore> {
    let features = build_features(input, degree_encoder, field_encoder);
    let probabilities = classifier.predict_probabilities(&features);

    let raw = probabilities
        .into_iter()
        .enumerate()
        .map(|(class_index, probability)| RoleScore {
            role: role_encoder
                .label(class_index)
                .unwrap_or("Unknown")
                .to_string(),
            confidence: probability,
        })
        .collect();

    adjust(raw, &input.degree, &input.field)
}

/// The external contract of the core: `predict(input) -> ranked top roles`.
///
/// Does not persist anything and performs no authorization; the only
/// observable side effect is the lazy artifact load.
pub struct CareerPredictor {
    store: ModelStore,
}

impl CareerPredictor {
    pub fn new(artifact_path: PathBuf) -> Self {
        Self {
            store: ModelStore::new(artifact_path),
        }
    }

    pub fn artifact_path(&self) -> &std::path::Path {
        self.store.artifact_path()
    }

    pub fn predict(&self, input: &CandidateInput) -> Result<Vec<RoleScore>, ArtifactError> {
        let bundle = self.store.bundle()?;
        Ok(run_pipeline(
            &bundle.model,
            &bundle.degree_encoder,
            &bundle.field_encoder,
            &bundle.role_encoder,
            input,
        ))
    }

    /// The current bundle, loading on first use.
    pub fn bundle(&self) -> Result<Arc<ModelArtifactBundle>, ArtifactError> {
        self.store.bundle()
    }

    /// Readiness probe: true once a bundle is cached. Never loads.
    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    /// Re-reads the artifact path and swaps the bundle for new requests.
    pub fn reload(&self) -> Result<Arc<ModelArtifactBundle>, ArtifactError> {
        self.store.reload()
    }

    /// Startup warm-up: try the load once so a broken artifact shows up in
    /// the logs immediately instead of on the first request. Not fatal; the
    /// retry boundary stays with callers.
    pub fn warm_up(&self) {
        match self.store.bundle() {
            Ok(bundle) => info!(version = %bundle.version, "model artifact warm"),
            Err(e) => warn!(
                "model artifact unavailable, predictions will return 503: {e}"
            ),
        }
    }
}
