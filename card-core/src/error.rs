//! Error types for card operations.
//!
//! The render pipeline itself is total and never returns these. They only
//! surface at the edges: loading template data and parsing vCard text.

use thiserror::Error;

/// Result type for card operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur while loading templates or reading card payloads.
#[derive(Debug, Error)]
pub enum CardError {
    /// No template registered under the category key.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Template definition violates a structural rule.
    #[error("Invalid template '{key}': {reason}")]
    InvalidTemplate {
        /// Category key of the offending template.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Template or record serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading template files from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// vCard text could not be parsed.
    #[error("Invalid vCard: {0}")]
    InvalidVCard(String),
}
