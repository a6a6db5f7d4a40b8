//! Risk clause detection
//!
//! Each pattern in the catalog contributes at most one finding per document:
//! the first match whose enclosing sentence is long enough to be meaningful.
//!
//! Sentence boundaries are found by scanning for a literal `.` only, so
//! abbreviations ("Inc.") and decimals ("1.5") split sentences. This is a
//! known limitation and is kept so findings stay stable.

use shared_types::RiskClause;
use tracing::trace;

use crate::catalog::{RiskCatalog, RiskCategory};

/// Sentences of this many characters or fewer are treated as noise
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Scans text against an injected catalog
#[derive(Debug, Clone)]
pub struct RiskDetector {
    catalog: RiskCatalog,
}

impl RiskDetector {
    pub fn new(catalog: RiskCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RiskCatalog {
        &self.catalog
    }

    /// Find risk clauses in `text`, in catalog order then pattern order
    pub fn detect(&self, text: &str) -> Vec<RiskClause> {
        let mut findings = Vec::new();
        if text.trim().is_empty() {
            return findings;
        }

        // Matching runs on the folded copy; sentences come from the original.
        let folded = fold_case(text);

        for category in self.catalog.iter() {
            for pattern in category.patterns() {
                let sentence = pattern
                    .find_iter(&folded)
                    .map(|m| enclosing_sentence(text, m.start(), m.end()))
                    .find(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS);

                if let Some(sentence) = sentence {
                    trace!(category = category.key(), pattern = pattern.as_str(), "Risk clause found");
                    findings.push(finding(category, sentence));
                }
            }
        }

        findings
    }
}

fn finding(category: &RiskCategory, sentence: &str) -> RiskClause {
    RiskClause {
        matched_sentence: sentence.to_string(),
        category_key: category.key().to_string(),
        category_type: category.display_type().to_string(),
        severity: category.severity(),
        explanation: category.explanation().to_string(),
    }
}

/// Lowercase `text` one character at a time, keeping any character whose
/// lowercase form has a different UTF-8 length. Byte offsets in the result
/// are valid offsets into `text`.
pub fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
                _ => c,
            }
        })
        .collect()
}

/// The trimmed sentence around the byte range `start..end`: from just after
/// the last `.` before `start` up to the first `.` at or after `end`.
pub fn enclosing_sentence(text: &str, start: usize, end: usize) -> &str {
    let begin = text[..start].rfind('.').map_or(0, |i| i + 1);
    let finish = text[end..].find('.').map_or(text.len(), |i| end + i);
    text[begin..finish].trim()
}
