//! Error types for ragchat
//!
//! This module provides error handling for all ragchat operations, including
//! corpus loading, chunking, embedding, vector search, and LLM completion.

use thiserror::Error;

/// Main error type for ragchat operations
#[derive(Error, Debug)]
pub enum RagError {
    /// Missing or unusable provider credential
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A precondition for the requested operation is not met (e.g. empty corpus)
    #[error("Precondition error: {0}")]
    Precondition(String),

    /// Model completion or retrieval+generation failure
    #[error("Generation error: {0}")]
    Generation(String),

    /// Text processing errors
    #[error("Text processing error: {0}")]
    TextProcessing(String),

    /// Embedding or vector search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Index persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// PDF processing errors
    #[error("PDF processing error: {0}")]
    Pdf(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(String),
}

/// Result type alias for ragchat operations
pub type Result<T> = std::result::Result<T, RagError>;

impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(err.to_string())
    }
}
