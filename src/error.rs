//! Error types for Flockr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Flockr
#[derive(Debug, Error)]
pub enum FlockrError {
    /// Health store unreachable or rejected a read/write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Content source produced nothing usable this cycle
    #[error("No content available: {0}")]
    ContentUnavailable(String),

    /// Pacing math cannot satisfy the daily budget
    #[error("Pacing error: {0}")]
    Pacing(String),

    /// Account missing from the roster or malformed
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Transport-level publish failure (API-level failures are Outcomes, not errors)
    #[error("Publish transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error from the health store backend
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type alias for Flockr operations
pub type Result<T> = std::result::Result<T, FlockrError>;
