//! Typed errors for the alignment library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during alignment operations.
#[derive(Debug, Error)]
pub enum AlignmentError {
    /// LLM or embedding provider unavailable or failed
    #[error("provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Candidate source lookup failed
    #[error("candidate source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// File I/O error during export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for alignment operations.
pub type Result<T> = std::result::Result<T, AlignmentError>;
