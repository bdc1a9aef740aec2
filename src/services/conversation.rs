//! Text Conversation Orchestrator
//!
//! Owns the append-only history of the text-verification flow: a user
//! submission is appended synchronously, the remote verification runs,
//! and exactly one terminal system turn (structured outcome or fixed
//! error notice) is appended when it resolves.
//!
//! While a submission is in flight a background tick task advances the
//! cosmetic "Analyzing..." indicator; the task's lifetime is strictly
//! bound to the in-flight flag via a `CancellationToken` and is also
//! cancelled on orchestrator teardown.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::models::conversation::{ConversationSnapshot, ConversationTurn};
use crate::services::analysis::AnalysisBackend;

/// System turn appended when verification fails for any reason
pub const VERIFY_ERROR_MESSAGE: &str = "Error connecting to the verification service.";

/// Mutable conversation state, guarded by one lock
#[derive(Default)]
struct ConversationState {
    /// Append-only; never reordered or mutated in place
    history: Vec<ConversationTurn>,
    pending_input: String,
    in_flight: bool,
    tick_phase: u8,
    tick_token: Option<CancellationToken>,
}

/// Orchestrator for the text-verification flow
pub struct Conversation {
    backend: Arc<dyn AnalysisBackend>,
    tick_interval: Duration,
    state: Arc<RwLock<ConversationState>>,
}

impl Conversation {
    /// Create a conversation over the given backend
    pub fn new(backend: Arc<dyn AnalysisBackend>, tick_interval: Duration) -> Self {
        Self {
            backend,
            tick_interval,
            state: Arc::new(RwLock::new(ConversationState::default())),
        }
    }

    /// Mirror the input box content
    pub async fn set_pending_input(&self, text: impl Into<String>) {
        let mut state = self.state.write().await;
        state.pending_input = text.into();
    }

    /// Submit a claim for verification.
    ///
    /// Empty or whitespace-only input is a silent no-op, as is a submission
    /// while another is in flight (the machine is `Idle <-> Submitting`).
    /// The user turn is appended before any await on the network; the
    /// in-flight flag is always cleared and the tick task cancelled in the
    /// final step, regardless of outcome.
    pub async fn submit(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let token = CancellationToken::new();
        {
            let mut state = self.state.write().await;
            if state.in_flight {
                debug!("submission ignored, verification already in flight");
                return;
            }

            state.history.push(ConversationTurn::user(trimmed));
            state.pending_input.clear();
            state.in_flight = true;
            state.tick_token = Some(token.clone());
            self.spawn_tick_task(token.clone());
        }

        // If the caller drops this future mid-await, the guard still clears
        // the in-flight flag and cancels the tick task.
        let mut guard = SubmitGuard {
            state: Arc::clone(&self.state),
            token,
            armed: true,
        };

        let outcome = self.backend.verify_text(trimmed).await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(outcome) => {
                debug!(verdict = %outcome.verdict, "verification succeeded");
                state.history.push(ConversationTurn::system_outcome(outcome));
            }
            Err(err) => {
                error!("verification failed: {}", err);
                state.history.push(ConversationTurn::system_text(VERIFY_ERROR_MESSAGE));
            }
        }

        // Mandatory cleanup on every path.
        state.in_flight = false;
        state.tick_phase = 0;
        if let Some(token) = state.tick_token.take() {
            token.cancel();
        }
        guard.armed = false;
    }

    /// Spawn the indicator tick task, scoped to the given token
    fn spawn_tick_task(&self, token: CancellationToken) {
        let state = Arc::clone(&self.state);
        let period = self.tick_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let mut state = state.write().await;
                        if !state.in_flight {
                            break;
                        }
                        state.tick_phase = (state.tick_phase + 1) % 4;
                    }
                }
            }
        });
    }

    /// Cancel any live tick task. Also invoked on drop.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        if let Some(token) = state.tick_token.take() {
            token.cancel();
        }
    }

    /// Current conversation state for the presentation layer
    pub async fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state.read().await;
        ConversationSnapshot {
            history: state.history.clone(),
            pending_input: state.pending_input.clone(),
            in_flight: state.in_flight,
            tick_phase: state.tick_phase,
        }
    }
}

/// Restores the idle state if a submission future is dropped between
/// appending the user turn and handling the verification result. Disarmed
/// on the normal completion path.
struct SubmitGuard {
    state: Arc<RwLock<ConversationState>>,
    token: CancellationToken,
    armed: bool,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.token.cancel();
        let state = Arc::clone(&self.state);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let mut state = state.write().await;
                state.in_flight = false;
                state.tick_phase = 0;
                state.tick_token = None;
            });
        } else if let Ok(mut state) = state.try_write() {
            // Runtime already gone; best effort without blocking.
            state.in_flight = false;
            state.tick_phase = 0;
            state.tick_token = None;
        }
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        // Best-effort teardown so no tick task outlives the orchestrator.
        if let Ok(mut state) = self.state.try_write() {
            if let Some(token) = state.tick_token.take() {
                token.cancel();
            }
        }
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}
