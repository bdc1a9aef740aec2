//! VeriScope - Client Orchestration Core
//!
//! This library is the client-side core of a media-authenticity checker.
//! It includes:
//! - An async boundary to the remote image-analysis and text-verification
//!   services, with a typed error taxonomy
//! - The image-session orchestrator (primary analysis + on-demand advanced
//!   heatmap, with stale-response discarding)
//! - The text-conversation orchestrator (append-only history with a scoped
//!   loading-indicator tick task)
//!
//! All detection is performed remotely; this crate only orchestrates
//! requests and exposes observable state for a presentation layer.

pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use models::analysis::{
    AnalysisMode, AnalysisReport, ArtifactMeta, ImageArtifact, ImageSessionSnapshot, Label,
    SlotStatus, REAL_SCORE_THRESHOLD,
};
pub use models::conversation::{
    Confidence, ConversationSnapshot, ConversationTurn, TurnContent, TurnRole,
    VerificationOutcome,
};
pub use models::settings::ClientConfig;
pub use services::analysis::{AnalysisBackend, AnalysisError, HttpAnalysisClient};
pub use services::conversation::{Conversation, VERIFY_ERROR_MESSAGE};
pub use services::image_session::ImageSession;
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
