use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How unfavorable a risk clause is to the document's recipient.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Contribution of one clause of this severity to the risk score.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown severity '{0}'. Expected one of: Low, Medium, High")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// A sentence that matched one of the catalog's risk patterns
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskClause {
    /// The enclosing sentence, trimmed
    #[serde(rename = "text")]
    pub matched_sentence: String,
    pub category_key: String,
    #[serde(rename = "type")]
    pub category_type: String,
    pub severity: Severity,
    pub explanation: String,
}

/// The components that make up a risk score
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoreBreakdown {
    /// Sum of severity weights over all findings
    pub clause_risk: f64,
    /// `min(word_count / 1000, 2.0)`
    pub length_factor: f64,
    /// `complexity / 10`
    pub complexity_factor: f64,
    /// Weighted sum before clamping into `[1.0, 10.0]`
    pub raw_score: f64,
}

/// Coarse banding of a risk score for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,      // < 3
    Moderate, // 3-6
    High,     // 6-8
    Severe,   // >= 8
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 3.0 {
            RiskLevel::Low
        } else if score < 6.0 {
            RiskLevel::Moderate
        } else if score < 8.0 {
            RiskLevel::High
        } else {
            RiskLevel::Severe
        }
    }
}

/// Deterministic analysis of a single document's text
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskReport {
    pub word_count: usize,
    pub complexity_score: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_clauses: Vec<RiskClause>,
    pub breakdown: ScoreBreakdown,
}
