//! Feature vector assembly: raw candidate input to the fixed-order numeric
//! vector the model was trained on.
//!
//! Column order is part of the artifact contract. The trainer fits on
//! `[degree, field, gpa, experience, graduation_year, skill_count]`; any
//! reordering here invalidates the model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prediction::encoder::CategoryEncoder;

/// Number of model features. Must agree with the artifact's trees.
pub const FEATURE_COUNT: usize = 6;

/// Raw prediction input as submitted by clients.
///
/// Numeric fields are kept as raw JSON values because clients send them as
/// numbers or numeric strings interchangeably; coercion happens in
/// [`build_features`] with documented fallbacks, never as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateInput {
    #[serde(default)]
    pub degree: String,
    /// The web client submits this as `specialization`.
    #[serde(default, alias = "specialization")]
    pub field: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub cgpa: Value,
    #[serde(default)]
    pub experience: Value,
    #[serde(default)]
    pub graduation_year: Value,
}

/// Ordered, fixed-length numeric feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Coerces a JSON value to f64: numbers pass through, numeric strings are
/// parsed, everything else is `None`.
pub fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerces a JSON value to i64. Fractional JSON numbers are truncated;
/// fractional strings do not parse as integers and fall through to `None`.
pub fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Assembles the model feature vector from raw input and the artifact's
/// category encoders. Malformed numerics default (gpa 0.0, experience 0,
/// graduation year 0); unknown categories take the encoder fallback code.
pub fn build_features(
    input: &CandidateInput,
    degree_encoder: &CategoryEncoder,
    field_encoder: &CategoryEncoder,
) -> FeatureVector {
    let degree_code = degree_encoder.encode(&input.degree);
    let field_code = field_encoder.encode(&input.field);

    let gpa = parse_f64(&input.cgpa).unwrap_or(0.0);
    let experience = parse_i64(&input.experience).unwrap_or(0);
    let graduation_year = parse_i64(&input.graduation_year).unwrap_or(0);
    let skill_count = input.skills.len();

    FeatureVector([
        degree_code as f64,
        field_code as f64,
        gpa,
        experience as f64,
        graduation_year as f64,
        skill_count as f64,
    ])
}
