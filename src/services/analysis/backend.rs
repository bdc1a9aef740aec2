//! Analysis Backend Abstraction
//!
//! Defines the async `AnalysisBackend` trait and its error taxonomy. The
//! orchestrators only ever see this trait, so tests (and any alternative
//! transport) inject their own implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::analysis::{AnalysisReport, ImageArtifact};
use crate::models::conversation::VerificationOutcome;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the remote analysis services.
///
/// Guard violations (no artifact, empty input) are *not* represented here;
/// those are caught before any network call and surfaced as
/// `AppError::Validation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisError {
    /// Transport-level failure (connect, timeout, body read).
    NetworkFailure { message: String },

    /// The service answered with a non-success status, or reported a
    /// logical failure in an otherwise successful response.
    ServerError {
        message: String,
        status: Option<u16>,
    },

    /// Success status but the body is unparseable or missing the fields
    /// required for the requested mode.
    MalformedResponse { message: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkFailure { message } => write!(f, "network failure: {}", message),
            Self::ServerError { message, status } => {
                if let Some(code) = status {
                    write!(f, "server error (HTTP {}): {}", code, message)
                } else {
                    write!(f, "server error: {}", message)
                }
            }
            Self::MalformedResponse { message } => write!(f, "malformed response: {}", message),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl AnalysisError {
    /// Create a network failure error
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Create a server error with an optional HTTP status
    pub fn server_error(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::ServerError {
            message: message.into(),
            status,
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Result type alias for backend operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Async boundary to the remote analysis services.
///
/// Implementations are stateless request/response adapters: no shared
/// mutable state, no automatic retries (a retry is always a user-initiated
/// re-submit), and every failure is a typed error value.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Standard image analysis: score, derived label, optional basic
    /// heatmap and feature map.
    async fn analyze(&self, artifact: &ImageArtifact) -> AnalysisResult<AnalysisReport>;

    /// Advanced analysis of the same artifact, returning only the
    /// high-resolution heatmap reference.
    async fn analyze_advanced(&self, artifact: &ImageArtifact) -> AnalysisResult<String>;

    /// Verify a text claim, returning the structured outcome.
    async fn verify_text(&self, text: &str) -> AnalysisResult<VerificationOutcome>;
}
