//! Data model shared by the risk engine, the text supplier and the server

pub mod types;

pub use types::{ParseSeverityError, RiskClause, RiskLevel, RiskReport, ScoreBreakdown, Severity};
