//! Text supplier for the risk engine
//!
//! Classifies an uploaded file by extension and pulls its text out. The
//! result is a plain string; nothing here knows about risk analysis.

pub mod error;
pub mod extract;
pub mod kind;

pub use error::ExtractError;
pub use extract::{ensure_analyzable, extract_text, ExtractedText, MIN_ANALYZABLE_CHARS};
pub use kind::{DocumentKind, ALLOWED_EXTENSIONS};
