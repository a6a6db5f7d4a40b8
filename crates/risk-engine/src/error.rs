use thiserror::Error;

/// Problems found while building a risk catalog. These are configuration
/// errors: a catalog that fails to build must stop the process at startup.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Risk category key must not be empty")]
    EmptyKey,

    #[error("Duplicate risk category key: {0}")]
    DuplicateKey(String),

    #[error("Risk category '{0}' has no patterns")]
    NoPatterns(String),

    #[error("Invalid pattern '{pattern}' in risk category '{category}': {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid catalog file: {0}")]
    Json(#[from] serde_json::Error),
}
