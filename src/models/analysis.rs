//! Image Analysis Models
//!
//! Data structures for the image-analysis flow: the user-selected artifact,
//! the analysis mode selector, the classification label and its score
//! threshold, the parsed analysis report, and the serializable session
//! snapshot consumed by the presentation layer.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score at or above which an image is classified as `Real`.
///
/// Single authority for classification: the label is always derived locally
/// from the score, never trusted from the wire, so display sites can never
/// disagree about the boundary.
pub const REAL_SCORE_THRESHOLD: f64 = 0.6;

/// An opaque binary artifact the user selected for analysis.
///
/// The `id` distinguishes re-selections of byte-identical files; the
/// orchestrator uses it (via its epoch counter) to discard responses that
/// resolve after a different artifact was selected.
#[derive(Clone)]
pub struct ImageArtifact {
    /// Unique identity for this selection
    pub id: Uuid,
    /// Original file name as reported by the picker
    pub file_name: String,
    /// MIME type (e.g. "image/png")
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl ImageArtifact {
    /// Create a new artifact from a selected file
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Serializable metadata view (without the payload)
    pub fn meta(&self) -> ArtifactMeta {
        ArtifactMeta {
            id: self.id,
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

impl std::fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Artifact metadata exposed in session snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Analysis mode selector for the remote `/analyze` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Score + label + basic heatmap
    Standard,
    /// High-resolution tampering heatmap only
    Advanced,
}

impl AnalysisMode {
    /// Query-parameter value for this mode, `None` for the default mode
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Advanced => Some("advanced"),
        }
    }
}

/// Authenticity classification derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    /// Derive the label from a score in `[0, 1]`.
    /// The boundary is inclusive: exactly `0.6` classifies as `Real`.
    pub fn from_score(score: f64) -> Self {
        if score >= REAL_SCORE_THRESHOLD {
            Self::Real
        } else {
            Self::Fake
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "Real",
            Self::Fake => "Fake",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed result of a standard image analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Authenticity score in `[0, 1]` (higher = more likely real)
    pub score: f64,
    /// Classification derived from `score` via [`Label::from_score`]
    pub label: Label,
    /// Basic tampering heatmap (data URL or server path), if the service
    /// produced one for this call
    pub heatmap: Option<String>,
    /// Per-metric feature values reported by the service
    pub features: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AnalysisReport {
    /// Build a report from wire fields, deriving the label from the score
    pub fn from_parts(
        score: f64,
        heatmap: Option<String>,
        features: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Self {
        Self {
            score,
            label: Label::from_score(score),
            heatmap,
            features,
        }
    }

    /// Real-confidence percentage for display bars (score x 100)
    pub fn real_confidence_pct(&self) -> f64 {
        self.score * 100.0
    }

    /// Fake-confidence percentage for display bars ((1 - score) x 100)
    pub fn fake_confidence_pct(&self) -> f64 {
        (1.0 - self.score) * 100.0
    }
}

/// Lifecycle of one request slot (primary or advanced)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl SlotStatus {
    /// Whether the slot has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Serializable view of the whole image session, consumed by any
/// presentation layer. Never carries the artifact payload.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSessionSnapshot {
    pub artifact: Option<ArtifactMeta>,
    pub primary_status: SlotStatus,
    pub primary_report: Option<AnalysisReport>,
    pub primary_error: Option<String>,
    pub basic_heatmap_visible: bool,
    pub advanced_status: SlotStatus,
    pub advanced_heatmap: Option<String>,
    pub advanced_visible: bool,
}
