//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::services::analysis::AnalysisError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Guard violations caught before any network call (e.g. no artifact
    /// selected). Never represents a transport or server failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (bad endpoint URL, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint URL parse errors (auto-converted from url::ParseError)
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client construction errors (auto-converted from reqwest::Error)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Analysis backend errors (auto-converted from AnalysisError)
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convert AppError to a string suitable for UI-facing responses
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
