//! Category encoders: map categorical strings (degree, field, role) to the
//! integer codes the trained model expects.
//!
//! The class lists come straight from the training job's label encoders, so
//! a code is simply the position of the class in that list. Values never
//! seen in training map to the encoder's fallback code. This mirrors the
//! trainer's own unseen-label handling; changing it without retraining
//! silently degrades predictions for unseen categories.

use serde::{Deserialize, Serialize};

/// Default code for values absent from the class list.
///
/// NOTE: 0 collides with the first trained class of every encoder. The
/// artifact can override this per encoder via `fallback_code` (e.g. -1)
/// once the training job is retrained to reserve a sentinel.
pub const FALLBACK_CODE: i64 = 0;

/// Immutable mapping from a finite set of known category strings to small
/// integer codes. One instance per categorical feature, plus one for the
/// role labels (used in the inverse direction via [`CategoryEncoder::label`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    /// Known classes in training order; a class's code is its position.
    classes: Vec<String>,
    /// Code returned for values outside `classes`.
    #[serde(default = "default_fallback_code")]
    fallback_code: i64,
}

fn default_fallback_code() -> i64 {
    FALLBACK_CODE
}

impl CategoryEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self {
            classes,
            fallback_code: FALLBACK_CODE,
        }
    }

    /// Case-sensitive exact lookup. Unknown values get the fallback code;
    /// this never fails and must not block the pipeline.
    pub fn encode(&self, value: &str) -> i64 {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|p| p as i64)
            .unwrap_or(self.fallback_code)
    }

    /// Inverse lookup: the human-readable label for a class index.
    pub fn label(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
