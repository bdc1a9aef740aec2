//! Application State
//!
//! Bundles the client configuration, the analysis backend, and the two
//! independent per-session orchestrators. A presentation shell (desktop
//! app, web view) holds one `AppState` per user session.

use std::sync::Arc;
use std::time::Duration;

use crate::models::settings::ClientConfig;
use crate::services::analysis::{AnalysisBackend, HttpAnalysisClient};
use crate::services::conversation::Conversation;
use crate::services::image_session::ImageSession;
use crate::utils::error::AppResult;

/// Per-session application state
pub struct AppState {
    config: ClientConfig,
    image_session: ImageSession,
    conversation: Conversation,
}

impl AppState {
    /// Build the state with the HTTP backend resolved from the config
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let backend: Arc<dyn AnalysisBackend> = Arc::new(HttpAnalysisClient::new(&config)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Build the state over an explicit backend. Injection seam for tests
    /// and alternative transports.
    pub fn with_backend(config: ClientConfig, backend: Arc<dyn AnalysisBackend>) -> Self {
        let image_session = ImageSession::new(Arc::clone(&backend));
        let conversation = Conversation::new(
            backend,
            Duration::from_millis(config.tick_interval_ms),
        );
        Self {
            config,
            image_session,
            conversation,
        }
    }

    /// The image-analysis orchestrator
    pub fn image_session(&self) -> &ImageSession {
        &self.image_session
    }

    /// The text-verification orchestrator
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish()
    }
}
