//! Error types for the ingreso-core library.
//!
//! Parsing itself never fails; these cover the edges around it
//! (reading recognized-text payloads, loading configuration).

use thiserror::Error;

/// Main error type for the ingreso library.
#[derive(Error, Debug)]
pub enum IngresoError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON payload or configuration file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the ingreso library.
pub type Result<T> = std::result::Result<T, IngresoError>;
