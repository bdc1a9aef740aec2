//! HTTP Analysis Client
//!
//! reqwest implementation of `AnalysisBackend` speaking to the two remote
//! services:
//!
//! - `POST {analyze_base}/analyze` — multipart body, field `file`; the
//!   advanced mode adds `?mode=advanced` and returns only a heatmap.
//! - `POST {verify_base}/api/verify-text` — JSON `{text}`.
//!
//! The client holds no mutable state and never retries; every failure is
//! mapped to a typed `AnalysisError`. Response parsing and error mapping
//! live in plain helper functions so they are unit-testable without a
//! server.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::backend::{AnalysisBackend, AnalysisError, AnalysisResult};
use crate::models::analysis::{AnalysisMode, AnalysisReport, ImageArtifact};
use crate::models::conversation::VerificationOutcome;
use crate::models::settings::ClientConfig;
use crate::utils::error::AppResult;

/// Maximum length of a response-body excerpt quoted in error messages
const BODY_EXCERPT_MAX: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Standard-mode response body
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    score: Option<f64>,
    heatmap: Option<String>,
    features: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Advanced-mode response body. The service can surface a logical failure
/// as a 200 with an `error` field, so success requires `heatmap` presence.
#[derive(Debug, Deserialize)]
struct AdvancedResponse {
    heatmap: Option<String>,
    error: Option<String>,
}

/// Error body shape used by both services (`error` plain, `detail` FastAPI)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP implementation of [`AnalysisBackend`].
///
/// # Thread Safety
///
/// `Send + Sync` — the reqwest `Client` is internally arc'd and clone-safe,
/// and all fields are immutable after construction.
pub struct HttpAnalysisClient {
    /// The reqwest HTTP client, shared across requests
    client: reqwest::Client,
    /// Fully resolved image-analysis endpoint
    analyze_url: Url,
    /// Fully resolved text-verification endpoint
    verify_url: Url,
}

impl HttpAnalysisClient {
    /// Build a client from the configured endpoint base URLs. Any path
    /// prefix on a base URL (e.g. a gateway mount point) is preserved.
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let analyze_url = join_endpoint(&config.analyze_base_url, "analyze")?;
        let verify_url = join_endpoint(&config.verify_base_url, "api/verify-text")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            analyze_url,
            verify_url,
        })
    }

    /// Build the multipart form carrying the artifact under field `file`.
    fn multipart_form(artifact: &ImageArtifact) -> AnalysisResult<Form> {
        let part = Part::bytes(artifact.bytes.to_vec())
            .file_name(artifact.file_name.clone())
            .mime_str(&artifact.mime_type)
            .map_err(|e| {
                AnalysisError::network_failure(format!(
                    "failed to build multipart request for '{}': {}",
                    artifact.file_name, e
                ))
            })?;
        Ok(Form::new().part("file", part))
    }

    /// POST the artifact to the analyze endpoint in the given mode and
    /// return the raw body of a successful response.
    async fn post_analyze(
        &self,
        artifact: &ImageArtifact,
        mode: AnalysisMode,
    ) -> AnalysisResult<String> {
        debug!(
            artifact = %artifact.file_name,
            mode = ?mode,
            "submitting artifact for analysis"
        );

        let mut request = self
            .client
            .post(self.analyze_url.clone())
            .multipart(Self::multipart_form(artifact)?);
        if let Some(value) = mode.query_value() {
            request = request.query(&[("mode", value)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.analyze_url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::network_failure(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let err = map_status_error(status.as_u16(), &body);
            warn!(status = status.as_u16(), "analysis request failed: {}", err);
            return Err(err);
        }

        Ok(body)
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    async fn analyze(&self, artifact: &ImageArtifact) -> AnalysisResult<AnalysisReport> {
        let body = self.post_analyze(artifact, AnalysisMode::Standard).await?;
        parse_standard_body(&body)
    }

    async fn analyze_advanced(&self, artifact: &ImageArtifact) -> AnalysisResult<String> {
        let body = self.post_analyze(artifact, AnalysisMode::Advanced).await?;
        parse_advanced_body(&body)
    }

    async fn verify_text(&self, text: &str) -> AnalysisResult<VerificationOutcome> {
        debug!(chars = text.len(), "submitting claim for verification");

        let response = self
            .client
            .post(self.verify_url.clone())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.verify_url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::network_failure(format!("failed to read response body: {}", e)))?;

        // A non-OK status is a hard failure regardless of body content.
        if !status.is_success() {
            let err = map_status_error(status.as_u16(), &body);
            warn!(status = status.as_u16(), "verification request failed: {}", err);
            return Err(err);
        }

        parse_verify_body(&body)
    }
}

/// Join an endpoint segment onto a base URL without discarding the base's
/// own path. `Url::join` treats a missing trailing slash as a file
/// component to replace, so the base path is normalized first.
fn join_endpoint(base: &str, segment: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(segment)
}

// ---------------------------------------------------------------------------
// Parsing and error mapping
// ---------------------------------------------------------------------------

/// Parse a standard-mode success body. The wire `label` (if any) is ignored;
/// the label is re-derived from `score`.
fn parse_standard_body(body: &str) -> AnalysisResult<AnalysisReport> {
    let parsed: AnalyzeResponse = serde_json::from_str(body).map_err(|e| {
        AnalysisError::malformed_response(format!("failed to parse analysis response: {}", e))
    })?;

    let score = parsed.score.ok_or_else(|| {
        AnalysisError::malformed_response("analysis response missing required field `score`")
    })?;

    Ok(AnalysisReport::from_parts(
        score,
        parsed.heatmap,
        parsed.features,
    ))
}

/// Parse an advanced-mode success body: `heatmap` must be present.
fn parse_advanced_body(body: &str) -> AnalysisResult<String> {
    let parsed: AdvancedResponse = serde_json::from_str(body).map_err(|e| {
        AnalysisError::malformed_response(format!("failed to parse heatmap response: {}", e))
    })?;

    if let Some(error) = parsed.error {
        return Err(AnalysisError::server_error(error, None));
    }

    match parsed.heatmap {
        Some(heatmap) if !heatmap.is_empty() => Ok(heatmap),
        _ => Err(AnalysisError::malformed_response(
            "heatmap response missing required field `heatmap`",
        )),
    }
}

/// Parse a verify-text success body into the structured outcome.
fn parse_verify_body(body: &str) -> AnalysisResult<VerificationOutcome> {
    serde_json::from_str(body).map_err(|e| {
        AnalysisError::malformed_response(format!("failed to parse verification response: {}", e))
    })
}

/// Map a reqwest transport error to `AnalysisError::NetworkFailure`.
fn map_transport_error(err: reqwest::Error, endpoint: &Url) -> AnalysisError {
    if err.is_connect() {
        AnalysisError::network_failure(format!("cannot connect to {}: {}", endpoint, err))
    } else if err.is_timeout() {
        AnalysisError::network_failure(format!("request to {} timed out: {}", endpoint, err))
    } else {
        AnalysisError::network_failure(err.to_string())
    }
}

/// Map a non-success HTTP status to `AnalysisError::ServerError`, quoting
/// the structured error message when the body carries one.
fn map_status_error(status: u16, body: &str) -> AnalysisError {
    let structured = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.detail));

    let message = match structured {
        Some(msg) => msg,
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => excerpt(body),
    };

    AnalysisError::server_error(message, Some(status))
}

/// Trim a body to a short excerpt safe for error messages.
fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_MAX {
        return trimmed.to_string();
    }
    let mut end = BODY_EXCERPT_MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
