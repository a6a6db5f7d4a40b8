//! Reading-difficulty score from sentence length and legal jargon density

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

/// Legal jargon counted towards term density (matched whole-word, any case)
pub const LEGAL_TERMS: &[&str] = &[
    "whereas",
    "heretofore",
    "hereinafter",
    "notwithstanding",
    "aforementioned",
    "pursuant",
    "thereof",
    "hereby",
    "hereunder",
    "indemnify",
    "covenant",
    "warranty",
    "liability",
    "jurisdiction",
    "arbitration",
    "severability",
    "consideration",
    "breach",
    "termination",
    "governing",
    "enforceable",
];

pub const MIN_COMPLEXITY: f64 = 1.0;
pub const MAX_COMPLEXITY: f64 = 10.0;

lazy_static! {
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref LEGAL_TERM_SET: HashSet<&'static str> = LEGAL_TERMS.iter().copied().collect();
}

/// Raw counts the complexity score is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub legal_term_count: usize,
}

impl TextStats {
    pub fn measure(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let sentence_count = SENTENCE_BREAK
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .count();
        let legal_term_count = words
            .iter()
            .filter(|w| LEGAL_TERM_SET.contains(w.to_lowercase().as_str()))
            .count();

        Self {
            word_count: words.len(),
            sentence_count,
            legal_term_count,
        }
    }

    pub fn avg_words_per_sentence(&self) -> f64 {
        if self.sentence_count == 0 {
            0.0
        } else {
            self.word_count as f64 / self.sentence_count as f64
        }
    }

    /// Percentage of words that are legal jargon
    pub fn legal_density_percent(&self) -> f64 {
        if self.word_count == 0 {
            0.0
        } else {
            self.legal_term_count as f64 / self.word_count as f64 * 100.0
        }
    }
}

/// Whitespace-separated word count, as used by the risk score
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Complexity score in `[1.0, 10.0]`
///
/// - sentence_complexity = min(avg_words_per_sentence / 15, 2.0)
/// - term_complexity = min(legal_density_percent / 2, 2.0)
/// - score = min((sentence_complexity + term_complexity) * 2.5, 10.0)
///
/// Text without any sentence scores 1.0. Short plain text can compute below
/// 1.0; it is raised to the floor so the score always stays in range.
pub fn complexity_score(text: &str) -> f64 {
    let stats = TextStats::measure(text);
    if stats.sentence_count == 0 {
        return MIN_COMPLEXITY;
    }

    let sentence_complexity = (stats.avg_words_per_sentence() / 15.0).min(2.0);
    let term_complexity = (stats.legal_density_percent() / 2.0).min(2.0);

    ((sentence_complexity + term_complexity) * 2.5).clamp(MIN_COMPLEXITY, MAX_COMPLEXITY)
}
