//! Rule-based risk analysis for contract text
//!
//! The engine scans document text for legally significant phrasings, scores
//! its reading complexity, and combines both into an overall risk score:
//!
//! - [`catalog`] - the risk categories and their patterns
//! - [`detector`] - sentence-level risk clause findings
//! - [`complexity`] - 1-10 complexity from sentence length and jargon density
//! - [`scoring`] - 1-10 risk from findings, complexity and length
//!
//! Everything here is pure and synchronous. A [`RiskEngine`] is immutable once
//! built and can be shared across threads.

pub mod catalog;
pub mod complexity;
pub mod detector;
pub mod error;
pub mod scoring;

pub use catalog::{RiskCatalog, RiskCategory, RiskCategoryDefinition};
pub use complexity::{complexity_score, word_count, TextStats};
pub use detector::RiskDetector;
pub use error::CatalogError;
pub use scoring::{risk_score, score_breakdown};

use shared_types::{RiskClause, RiskLevel, RiskReport};
use tracing::debug;

/// RiskEngine entry point
#[derive(Debug, Clone)]
pub struct RiskEngine {
    detector: RiskDetector,
}

impl RiskEngine {
    pub fn new(catalog: RiskCatalog) -> Self {
        Self {
            detector: RiskDetector::new(catalog),
        }
    }

    /// Engine over the six canonical categories
    pub fn standard() -> Result<Self, CatalogError> {
        Ok(Self::new(RiskCatalog::standard()?))
    }

    pub fn catalog(&self) -> &RiskCatalog {
        self.detector.catalog()
    }

    pub fn detect(&self, text: &str) -> Vec<RiskClause> {
        self.detector.detect(text)
    }

    pub fn complexity(&self, text: &str) -> f64 {
        complexity_score(text)
    }

    pub fn risk_score(&self, findings: &[RiskClause], complexity: f64, word_count: usize) -> f64 {
        risk_score(findings, complexity, word_count)
    }

    /// Run the whole pipeline over one document's text
    pub fn analyze(&self, text: &str) -> RiskReport {
        let word_count = word_count(text);
        let complexity_score = self.complexity(text);
        let risk_clauses = self.detect(text);

        let breakdown = score_breakdown(
            risk_clauses.iter().map(|c| c.severity),
            complexity_score,
            word_count,
        );
        let risk_score = scoring::clamp_score(&breakdown);

        debug!(
            word_count,
            complexity_score,
            risk_score,
            findings = risk_clauses.len(),
            "Analyzed document text"
        );

        RiskReport {
            word_count,
            complexity_score,
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            risk_clauses,
            breakdown,
        }
    }
}
