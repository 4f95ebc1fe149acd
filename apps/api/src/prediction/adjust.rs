//! Confidence adjustment: turns raw classifier probabilities into the
//! ranked, explainable distribution the API returns.
//!
//! Steps, in order, all deterministic and side-effect-free:
//! 1. scale probabilities to percentages
//! 2. apply domain-bias corrections from [`CORRECTION_RULES`]
//! 3. floor negatives at 0
//! 4. renormalize to sum 100, rounded to 2 decimals
//! 5. stable sort descending (ties keep the model's class order)
//! 6. truncate to the top entries

use serde::{Deserialize, Serialize};

/// Number of ranked roles returned per prediction.
pub const TOP_ROLES: usize = 3;

/// One role recommendation. After adjustment, `confidence` is a percentage
/// in [0, 100] rounded to 2 decimals, and one prediction's confidences sum
/// to 100 within rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: String,
    pub confidence: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Correction rules
// ────────────────────────────────────────────────────────────────────────────

/// A deterministic correction for a known directional bias of the trained
/// model. Degree and field match case-insensitively against the input;
/// each delta is applied, in percentage points, to every score whose role
/// matches case-insensitively.
///
/// The classifier is trained on synthetic, imbalanced data; these rules are
/// auditable patches applied until the next retrain. Add rows here, not
/// branches in the algorithm.
pub struct CorrectionRule {
    pub degree: &'static str,
    pub field: &'static str,
    pub deltas: &'static [(&'static str, f64)],
}

/// The model systematically overpredicts research roles and underpredicts
/// software engineering for B.Tech computer science profiles.
pub const CORRECTION_RULES: &[CorrectionRule] = &[CorrectionRule {
    degree: "b.tech",
    field: "computer science",
    deltas: &[("research scientist", -35.0), ("software engineer", 25.0)],
}];

// ────────────────────────────────────────────────────────────────────────────
// Adjustment stages
// ────────────────────────────────────────────────────────────────────────────

/// Applies every matching correction rule to the percentage-scale scores.
/// Deltas hit each matching role entry independently of its rank.
pub fn apply_corrections(scores: &mut [RoleScore], degree: &str, field: &str) {
    for rule in CORRECTION_RULES {
        if !degree.eq_ignore_ascii_case(rule.degree) || !field.eq_ignore_ascii_case(rule.field) {
            continue;
        }
        for score in scores.iter_mut() {
            for (role, delta) in rule.deltas {
                if score.role.eq_ignore_ascii_case(role) {
                    score.confidence += delta;
                }
            }
        }
    }
}

/// Corrections may drive a confidence negative; negative confidence is
/// meaningless and is truncated to 0, not wrapped or signed.
pub fn floor_negatives(scores: &mut [RoleScore]) {
    for score in scores.iter_mut() {
        score.confidence = score.confidence.max(0.0);
    }
}

/// Rescales the floored confidences to sum to 100, rounded to 2 decimals.
/// A zero sum (every class floored away) is treated as 1 so the division
/// never blows up.
pub fn renormalize(scores: &mut [RoleScore]) {
    let mut total: f64 = scores.iter().map(|s| s.confidence).sum();
    if total == 0.0 {
        total = 1.0;
    }
    for score in scores.iter_mut() {
        score.confidence = round2(score.confidence / total * 100.0);
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Full adjustment pass over raw class probabilities (0..1, in the model's
/// class order). Returns at most [`TOP_ROLES`] entries, descending by
/// confidence; fewer only when the model knows fewer classes.
pub fn adjust(raw: Vec<RoleScore>, degree: &str, field: &str) -> Vec<RoleScore> {
    let mut scores = raw;
    for score in &mut scores {
        score.confidence *= 100.0;
    }

    apply_corrections(&mut scores, degree, field);
    floor_negatives(&mut scores);
    renormalize(&mut scores);

    // Stable sort: equal confidences keep the classifier's class order, so
    // repeated calls with identical input rank identically.
    scores.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scores.truncate(TOP_ROLES);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(scores: &[(&str, f64)]) -> Vec<RoleScore> {
        scores
            .iter()
            .map(|(role, p)| RoleScore {
                role: role.to_string(),
                confidence: *p,
            })
            .collect()
    }

    fn confidence_of<'a>(scores: &'a [RoleScore], role: &str) -> &'a RoleScore {
        scores
            .iter()
            .find(|s| s.role == role)
            .unwrap_or_else(|| panic!("role {role} missing from {scores:?}"))
    }

    fn total(scores: &[RoleScore]) -> f64 {
        scores.iter().map(|s| s.confidence).sum()
    }

    // ── correction stage ────────────────────────────────────────────────────

    #[test]
    fn test_correction_deltas_applied_before_renormalization() {
        let mut scores = raw(&[
            ("Software Engineer", 40.0),
            ("Research Scientist", 35.0),
            ("Data Scientist", 25.0),
        ]);
        apply_corrections(&mut scores, "B.Tech", "Computer Science");

        assert_eq!(confidence_of(&scores, "Software Engineer").confidence, 65.0);
        assert_eq!(confidence_of(&scores, "Research Scientist").confidence, 0.0);
        assert_eq!(confidence_of(&scores, "Data Scientist").confidence, 25.0);
    }

    #[test]
    fn test_correction_matches_any_case() {
        let mut scores = raw(&[("SOFTWARE ENGINEER", 40.0)]);
        apply_corrections(&mut scores, "b.tech", "COMPUTER SCIENCE");
        assert_eq!(scores[0].confidence, 65.0);
    }

    #[test]
    fn test_correction_applies_per_entry_not_per_rank() {
        // The rule fires for the matching role regardless of where it sits.
        let mut scores = raw(&[
            ("Data Scientist", 60.0),
            ("Web Developer", 30.0),
            ("Research Scientist", 10.0),
        ]);
        apply_corrections(&mut scores, "B.Tech", "Computer Science");
        assert_eq!(
            confidence_of(&scores, "Research Scientist").confidence,
            -25.0
        );
    }

    #[test]
    fn test_no_correction_outside_rule_profile() {
        let mut scores = raw(&[
            ("Software Engineer", 40.0),
            ("Research Scientist", 35.0),
        ]);
        apply_corrections(&mut scores, "MBA", "Computer Science");
        assert_eq!(confidence_of(&scores, "Software Engineer").confidence, 40.0);
        assert_eq!(
            confidence_of(&scores, "Research Scientist").confidence,
            35.0
        );

        apply_corrections(&mut scores, "B.Tech", "Mechanical");
        assert_eq!(confidence_of(&scores, "Software Engineer").confidence, 40.0);
    }

    // ── floor and renormalize ───────────────────────────────────────────────

    #[test]
    fn test_floor_truncates_negatives_to_zero() {
        let mut scores = raw(&[("A", -25.0), ("B", 40.0)]);
        floor_negatives(&mut scores);
        assert_eq!(scores[0].confidence, 0.0);
        assert_eq!(scores[1].confidence, 40.0);
    }

    #[test]
    fn test_renormalize_sums_to_one_hundred() {
        let mut scores = raw(&[("A", 65.0), ("B", 0.0), ("C", 25.0)]);
        renormalize(&mut scores);
        assert!((total(&scores) - 100.0).abs() <= 0.02);
        assert!((scores[0].confidence - 72.22).abs() < 1e-9);
        assert!((scores[2].confidence - 27.78).abs() < 1e-9);
    }

    #[test]
    fn test_renormalize_guards_zero_sum() {
        let mut scores = raw(&[("A", 0.0), ("B", 0.0)]);
        renormalize(&mut scores);
        assert_eq!(scores[0].confidence, 0.0);
        assert_eq!(scores[1].confidence, 0.0);
    }

    // ── full adjustment ─────────────────────────────────────────────────────

    /// The documented scenario: B.Tech / Computer Science with raw
    /// probabilities {SE: 0.40, RS: 0.35, DS: 0.25}.
    #[test]
    fn test_btech_cs_scenario() {
        let result = adjust(
            raw(&[
                ("Software Engineer", 0.40),
                ("Research Scientist", 0.35),
                ("Data Scientist", 0.25),
            ]),
            "B.Tech",
            "Computer Science",
        );

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].role, "Software Engineer");
        assert!(result[0].confidence > 50.0);
        // Research Scientist's share shrinks relative to its raw 35%.
        assert!(confidence_of(&result, "Research Scientist").confidence < 35.0);
        assert!((total(&result) - 100.0).abs() <= 0.02);
    }

    #[test]
    fn test_corrected_role_never_outranked_by_correction() {
        // Software Engineer ranked second raw; after the +25 correction it
        // must rank at or above its pre-correction position.
        let result = adjust(
            raw(&[
                ("Research Scientist", 0.45),
                ("Software Engineer", 0.35),
                ("Data Scientist", 0.20),
            ]),
            "b.tech",
            "computer science",
        );
        assert_eq!(result[0].role, "Software Engineer");
    }

    #[test]
    fn test_sum_invariant_for_unmatched_profile() {
        let result = adjust(
            raw(&[("A", 0.5), ("B", 0.3), ("C", 0.2)]),
            "MBA",
            "Philosophy",
        );
        assert!((total(&result) - 100.0).abs() <= 0.02);
    }

    #[test]
    fn test_unmatched_profile_only_shifts_by_rounding() {
        let result = adjust(
            raw(&[("A", 0.5), ("B", 0.3), ("C", 0.2)]),
            "MBA",
            "Finance",
        );
        assert!((confidence_of(&result, "A").confidence - 50.0).abs() <= 0.01);
        assert!((confidence_of(&result, "B").confidence - 30.0).abs() <= 0.01);
        assert!((confidence_of(&result, "C").confidence - 20.0).abs() <= 0.01);
    }

    #[test]
    fn test_no_negative_confidence_returned() {
        let result = adjust(
            raw(&[("Research Scientist", 0.10), ("Software Engineer", 0.90)]),
            "B.Tech",
            "Computer Science",
        );
        assert!(result.iter().all(|s| s.confidence >= 0.0));
    }

    #[test]
    fn test_result_sorted_descending() {
        let result = adjust(
            raw(&[("A", 0.1), ("B", 0.6), ("C", 0.3)]),
            "none",
            "none",
        );
        assert!(result
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
        assert_eq!(result[0].role, "B");
    }

    #[test]
    fn test_ties_keep_class_order() {
        let result = adjust(
            raw(&[("A", 0.25), ("B", 0.25), ("C", 0.25), ("D", 0.25)]),
            "none",
            "none",
        );
        assert_eq!(result[0].role, "A");
        assert_eq!(result[1].role, "B");
        assert_eq!(result[2].role, "C");
    }

    #[test]
    fn test_truncates_to_top_three() {
        let result = adjust(
            raw(&[("A", 0.4), ("B", 0.3), ("C", 0.2), ("D", 0.1)]),
            "none",
            "none",
        );
        assert_eq!(result.len(), TOP_ROLES);
        assert!(!result.iter().any(|s| s.role == "D"));
    }

    #[test]
    fn test_fewer_classes_than_top_n_returns_all() {
        let result = adjust(raw(&[("A", 0.7), ("B", 0.3)]), "none", "none");
        assert_eq!(result.len(), 2);
        assert!((total(&result) - 100.0).abs() <= 0.02);
    }

    #[test]
    fn test_adjustment_is_deterministic() {
        let input = [("A", 0.37), ("B", 0.33), ("C", 0.30)];
        let first = adjust(raw(&input), "B.Tech", "Computer Science");
        let second = adjust(raw(&input), "B.Tech", "Computer Science");
        assert_eq!(first, second);
    }

    #[test]
    fn test_confidences_rounded_to_two_decimals() {
        let result = adjust(
            raw(&[("A", 1.0 / 3.0), ("B", 1.0 / 3.0), ("C", 1.0 / 3.0)]),
            "none",
            "none",
        );
        for score in &result {
            let scaled = score.confidence * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }
}
