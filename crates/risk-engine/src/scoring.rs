//! Overall risk score from findings, complexity and document length

use shared_types::{RiskClause, ScoreBreakdown, Severity};

pub const MIN_RISK: f64 = 1.0;
pub const MAX_RISK: f64 = 10.0;

const CLAUSE_WEIGHT: f64 = 0.6;
const LENGTH_WEIGHT: f64 = 0.2;
const COMPLEXITY_WEIGHT: f64 = 0.2;

/// Compute each component of the score from the severities of the findings.
///
/// `raw_score` is the weighted sum capped at 10.0 but not floored.
pub fn score_breakdown<I>(severities: I, complexity: f64, word_count: usize) -> ScoreBreakdown
where
    I: IntoIterator<Item = Severity>,
{
    let clause_risk: f64 = severities.into_iter().map(|s| s.weight() as f64).sum();
    let length_factor = (word_count as f64 / 1000.0).min(2.0);
    let complexity_factor = complexity / 10.0;

    let raw_score = (clause_risk * CLAUSE_WEIGHT
        + length_factor * LENGTH_WEIGHT
        + complexity_factor * COMPLEXITY_WEIGHT)
        .min(MAX_RISK);

    ScoreBreakdown {
        clause_risk,
        length_factor,
        complexity_factor,
        raw_score,
    }
}

/// Clamp a breakdown's raw score into `[1.0, 10.0]`
pub fn clamp_score(breakdown: &ScoreBreakdown) -> f64 {
    breakdown.raw_score.clamp(MIN_RISK, MAX_RISK)
}

/// Risk score in `[1.0, 10.0]`
///
/// score = min(clause_risk * 0.6 + length_factor * 0.2 + complexity_factor * 0.2, 10.0),
/// raised to 1.0 when a document with no findings computes lower.
pub fn risk_score(findings: &[RiskClause], complexity: f64, word_count: usize) -> f64 {
    let breakdown = score_breakdown(findings.iter().map(|f| f.severity), complexity, word_count);
    clamp_score(&breakdown)
}
