//! The trained artifact bundle: classifier plus label/category encoders,
//! exported by the offline training job as one versioned JSON document.
//!
//! Loading failures are availability errors. A process that cannot load the
//! bundle cannot serve predictions at all; nothing here is a per-request
//! validation concern.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::prediction::encoder::CategoryEncoder;
use crate::prediction::features::FEATURE_COUNT;
use crate::prediction::forest::DecisionForest;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {path}: {source}")]
    Missing {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("model artifact at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("model artifact at {path} is inconsistent: {reason}")]
    Inconsistent { path: PathBuf, reason: String },
}

/// The trained classifier, its category encoders, and the role-label
/// encoder. Immutable once loaded; shared read-only for the process
/// lifetime and replaced only by an explicit reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifactBundle {
    /// Version stamped by the training job, echoed in API responses.
    pub version: String,
    pub model: DecisionForest,
    pub degree_encoder: CategoryEncoder,
    pub field_encoder: CategoryEncoder,
    pub role_encoder: CategoryEncoder,
}

impl ModelArtifactBundle {
    /// Reads, deserializes, and validates the bundle. Any failure is final
    /// for this attempt; retrying is the caller's decision.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Missing {
            path: path.to_path_buf(),
            source,
        })?;

        let bundle: ModelArtifactBundle =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        bundle.validate().map_err(|reason| ArtifactError::Inconsistent {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(
            version = %bundle.version,
            roles = bundle.role_encoder.len(),
            trees = bundle.model.trees.len(),
            "model artifact loaded"
        );
        Ok(bundle)
    }

    /// Human-readable role label for a class index. Indices come from the
    /// model's class order, which validation pins to the role encoder.
    pub fn role_name(&self, class_index: usize) -> &str {
        self.role_encoder.label(class_index).unwrap_or("Unknown")
    }

    /// Internal consistency checks. The evaluator indexes these arrays
    /// without further bounds checks, so everything it relies on is pinned
    /// here at load time.
    fn validate(&self) -> Result<(), String> {
        let n_classes = self.model.n_classes;
        if n_classes == 0 {
            return Err("model declares zero classes".to_string());
        }
        if n_classes != self.role_encoder.len() {
            return Err(format!(
                "model has {} classes but the role encoder has {} labels",
                n_classes,
                self.role_encoder.len()
            ));
        }
        if self.model.trees.is_empty() {
            return Err("model contains no trees".to_string());
        }
        if self.degree_encoder.is_empty() || self.field_encoder.is_empty() {
            return Err("category encoders must not be empty".to_string());
        }

        for (t, tree) in self.model.trees.iter().enumerate() {
            let nodes = tree.feature.len();
            if nodes == 0 {
                return Err(format!("tree {t} has no nodes"));
            }
            if tree.threshold.len() != nodes
                || tree.left.len() != nodes
                || tree.right.len() != nodes
                || tree.value.len() != nodes
            {
                return Err(format!("tree {t} node arrays disagree in length"));
            }
            for (i, &feature) in tree.feature.iter().enumerate() {
                if feature >= 0 {
                    if feature as usize >= FEATURE_COUNT {
                        return Err(format!(
                            "tree {t} node {i} splits on feature {feature}, model has {FEATURE_COUNT}"
                        ));
                    }
                    let (left, right) = (tree.left[i], tree.right[i]);
                    // Children must sit strictly after their parent; this is
                    // what guarantees the evaluator's walk terminates.
                    let child_ok = |c: i64| c > i as i64 && (c as usize) < nodes;
                    if !child_ok(left) || !child_ok(right) {
                        return Err(format!(
                            "tree {t} node {i} has out-of-range children ({left}, {right})"
                        ));
                    }
                }
                if tree.value[i].len() != n_classes {
                    return Err(format!(
                        "tree {t} node {i} has {} class weights, expected {n_classes}",
                        tree.value[i].len()
                    ));
                }
            }
        }
        Ok(())
    }
}
