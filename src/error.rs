//! Error types for the Glossa library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`GlossaError`] enum. Most callers never see these errors on the query
//! path: persisted artifacts fall back to empty state and failing correction
//! strategies are skipped, so errors mainly surface from mining, configuration
//! loading, corpus reading and explicit persistence calls.
//!
//! # Examples
//!
//! ```
//! use glossa::error::{GlossaError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(GlossaError::config("min_word_length must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Glossa operations.
#[derive(Error, Debug)]
pub enum GlossaError {
    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or mining options
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted artifact errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Language model endpoint errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with GlossaError.
pub type Result<T> = std::result::Result<T, GlossaError>;

impl GlossaError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        GlossaError::Config(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        GlossaError::Storage(msg.into())
    }

    /// Create a new LLM error.
    pub fn llm<S: Into<String>>(msg: S) -> Self {
        GlossaError::Llm(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        GlossaError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
