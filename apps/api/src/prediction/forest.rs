//! Decision-forest inference over the node arrays exported by the training
//! job.
//!
//! The trait seam exists so the pipeline and its tests can swap the backing
//! classifier; the production backend is the forest deserialized from the
//! artifact bundle.

use serde::{Deserialize, Serialize};

use crate::prediction::features::FeatureVector;

/// A multi-class classifier producing one probability per known class.
///
/// Contract: the returned vector has one entry per class, all non-negative,
/// summing to 1. Class order is the artifact's role-label order and never
/// changes for a loaded model.
pub trait Classifier: Send + Sync {
    fn predict_probabilities(&self, features: &FeatureVector) -> Vec<f64>;
}

/// One trained tree in flattened node-array form.
///
/// `feature[i] < 0` marks node `i` as a leaf. For internal nodes the split
/// is `x[feature[i]] <= threshold[i]` going left, otherwise right. `value`
/// holds the per-class training sample weights at each node; leaf rows are
/// normalized into distributions at evaluation time.
///
/// Invariant (checked at artifact load): children always have a higher
/// index than their parent, so a walk from the root terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Walks the tree to a leaf and returns that leaf's class distribution.
    fn leaf_distribution(&self, features: &FeatureVector, n_classes: usize) -> Vec<f64> {
        let x = features.as_slice();
        let mut node = 0usize;
        while self.feature[node] >= 0 {
            let split_feature = self.feature[node] as usize;
            node = if x[split_feature] <= self.threshold[node] {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        normalize_row(&self.value[node], n_classes)
    }
}

/// Averaged ensemble of decision trees, the shape the trainer exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionForest {
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for DecisionForest {
    fn predict_probabilities(&self, features: &FeatureVector) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf_distribution(features, self.n_classes);
            for (total, p) in probabilities.iter_mut().zip(leaf) {
                *total += p;
            }
        }
        let tree_count = self.trees.len() as f64;
        for p in &mut probabilities {
            *p /= tree_count;
        }
        probabilities
    }
}

/// Normalizes a leaf weight row into a distribution. An all-zero row (an
/// empty leaf) degrades to uniform rather than NaN.
fn normalize_row(row: &[f64], n_classes: usize) -> Vec<f64> {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 {
        return vec![1.0 / n_classes as f64; n_classes];
    }
    row.iter().map(|w| w / sum).collect()
}
