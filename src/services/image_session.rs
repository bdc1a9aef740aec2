//! Image Session Orchestrator
//!
//! Owns the lifecycle of one image-analysis session: artifact selection,
//! the primary analysis request, and the independent on-demand advanced
//! heatmap request.
//!
//! Concurrency rules:
//! - At most one primary request in flight; a second `run_primary_analysis`
//!   while loading is ignored, not queued.
//! - Advanced requests supersede each other: only the most recently issued
//!   one may mutate state (last-issued-wins, not first-response-wins).
//! - Selecting a new artifact bumps the session epoch; any resolution
//!   carrying a stale epoch is discarded on arrival, so no result is ever
//!   shown against a different artifact.
//!
//! Cancellation is cooperative: superseded responses are dropped when they
//! arrive, the transport is never aborted.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::analysis::{
    AnalysisReport, ImageArtifact, ImageSessionSnapshot, SlotStatus,
};
use crate::services::analysis::AnalysisBackend;
use crate::utils::error::{AppError, AppResult};

/// Mutable session state, guarded by one lock
#[derive(Debug, Default)]
struct SessionState {
    selected: Option<ImageArtifact>,
    primary_status: SlotStatus,
    primary_report: Option<AnalysisReport>,
    primary_error: Option<String>,
    basic_heatmap_visible: bool,
    advanced_status: SlotStatus,
    advanced_heatmap: Option<String>,
    advanced_visible: bool,
    /// Bumped on every artifact selection; stale guard for both slots
    epoch: u64,
    /// Bumped on every advanced launch; last-issued-wins guard
    advanced_seq: u64,
}

impl SessionState {
    /// Reset everything derived from the previous artifact
    fn reset_results(&mut self) {
        self.primary_status = SlotStatus::Idle;
        self.primary_report = None;
        self.primary_error = None;
        self.basic_heatmap_visible = false;
        self.advanced_status = SlotStatus::Idle;
        self.advanced_heatmap = None;
        self.advanced_visible = false;
    }
}

/// Orchestrator for the image-analysis flow
pub struct ImageSession {
    backend: Arc<dyn AnalysisBackend>,
    state: RwLock<SessionState>,
}

impl ImageSession {
    /// Create a session over the given backend
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Select a new artifact. Always allowed; clears every result derived
    /// from the previous artifact and invalidates in-flight responses.
    pub async fn select_artifact(&self, artifact: ImageArtifact) {
        let mut state = self.state.write().await;
        debug!(artifact = %artifact.file_name, "artifact selected, session reset");
        state.reset_results();
        state.epoch += 1;
        state.selected = Some(artifact);
    }

    /// Run the primary (standard-mode) analysis for the selected artifact.
    ///
    /// Returns `AppError::Validation` when no artifact is selected. Ignored
    /// while a primary request is already loading. Network and server
    /// failures land in the session state, not in the returned result.
    pub async fn run_primary_analysis(&self) -> AppResult<()> {
        let (artifact, epoch) = {
            let mut state = self.state.write().await;
            let artifact = state
                .selected
                .clone()
                .ok_or_else(|| AppError::validation("no artifact selected"))?;

            if state.primary_status == SlotStatus::Loading {
                debug!("primary analysis already in flight, ignoring re-trigger");
                return Ok(());
            }

            state.primary_status = SlotStatus::Loading;
            state.primary_error = None;
            (artifact, state.epoch)
        };

        let outcome = self.backend.analyze(&artifact).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("discarding primary result for a superseded artifact");
            return Ok(());
        }

        match outcome {
            Ok(report) => {
                debug!(score = report.score, label = %report.label, "primary analysis succeeded");
                state.primary_report = Some(report);
                state.primary_status = SlotStatus::Success;
            }
            Err(err) => {
                warn!("primary analysis failed: {}", err);
                state.primary_error = Some(err.to_string());
                state.primary_status = SlotStatus::Error;
            }
        }
        Ok(())
    }

    /// Run the advanced heatmap analysis for the selected artifact.
    ///
    /// Allowed whenever an artifact is selected, including re-triggering
    /// from any terminal advanced state. The overlay is marked visible and
    /// loading before the call so the presentation layer can show a pending
    /// indicator immediately. A newer launch supersedes an older in-flight
    /// one; a failure reverts visibility so no absent heatmap is claimed.
    pub async fn run_advanced_analysis(&self) -> AppResult<()> {
        let (artifact, epoch, seq) = {
            let mut state = self.state.write().await;
            let artifact = state
                .selected
                .clone()
                .ok_or_else(|| AppError::validation("no artifact selected"))?;

            state.advanced_seq += 1;
            state.advanced_status = SlotStatus::Loading;
            state.advanced_visible = true;
            // Overlays are mutually exclusive.
            state.basic_heatmap_visible = false;
            (artifact, state.epoch, state.advanced_seq)
        };

        let outcome = self.backend.analyze_advanced(&artifact).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch || state.advanced_seq != seq {
            debug!("discarding superseded advanced heatmap response");
            return Ok(());
        }

        match outcome {
            Ok(heatmap) => {
                debug!("advanced heatmap received");
                state.advanced_heatmap = Some(heatmap);
                state.advanced_status = SlotStatus::Success;
            }
            Err(err) => {
                warn!("advanced analysis failed: {}", err);
                state.advanced_status = SlotStatus::Error;
                state.advanced_visible = false;
            }
        }
        Ok(())
    }

    /// Toggle the basic heatmap overlay. Meaningful only when the primary
    /// report carries a heatmap; forces the advanced overlay off.
    pub async fn toggle_basic_heatmap(&self) {
        let mut state = self.state.write().await;
        let has_heatmap = state
            .primary_report
            .as_ref()
            .map(|r| r.heatmap.is_some())
            .unwrap_or(false);
        if !has_heatmap {
            return;
        }
        state.basic_heatmap_visible = !state.basic_heatmap_visible;
        state.advanced_visible = false;
    }

    /// Current session state for the presentation layer
    pub async fn snapshot(&self) -> ImageSessionSnapshot {
        let state = self.state.read().await;
        ImageSessionSnapshot {
            artifact: state.selected.as_ref().map(|a| a.meta()),
            primary_status: state.primary_status,
            primary_report: state.primary_report.clone(),
            primary_error: state.primary_error.clone(),
            basic_heatmap_visible: state.basic_heatmap_visible,
            advanced_status: state.advanced_status,
            advanced_heatmap: state.advanced_heatmap.clone(),
            advanced_visible: state.advanced_visible,
        }
    }
}

impl std::fmt::Debug for ImageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSession").finish()
    }
}
