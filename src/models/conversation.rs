//! Text Conversation Models
//!
//! Data structures for the text-verification flow: conversation turns, the
//! structured verification outcome, and the serializable conversation
//! snapshot with its cosmetic loading indicator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    System,
}

/// Confidence value as returned by the verify endpoint.
///
/// The service reports either a number (e.g. `0.95`) or a preformatted
/// string (e.g. `"95%"`); both are accepted and preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Structured verdict returned by the text-verification service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verdict: String,
    pub confidence: Confidence,
    pub explanation: String,
}

/// Payload of a conversation turn: plain text for user submissions and
/// error notices, a structured outcome for successful verifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Outcome(VerificationOutcome),
    Text(String),
}

/// One entry in the append-only conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: TurnContent,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// A user submission
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: TurnContent::Text(text.into()),
            timestamp: Utc::now(),
        }
    }

    /// A successful system reply carrying the structured outcome
    pub fn system_outcome(outcome: VerificationOutcome) -> Self {
        Self {
            role: TurnRole::System,
            content: TurnContent::Outcome(outcome),
            timestamp: Utc::now(),
        }
    }

    /// A system reply carrying plain text (error notices)
    pub fn system_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: TurnContent::Text(text.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Serializable view of the conversation state
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub history: Vec<ConversationTurn>,
    pub pending_input: String,
    pub in_flight: bool,
    /// Cosmetic indicator phase, cycling 0..=3
    pub tick_phase: u8,
}

impl ConversationSnapshot {
    /// Ellipsis suffix for the "Analyzing..." indicator
    pub fn loading_dots(&self) -> &'static str {
        match self.tick_phase % 4 {
            0 => "",
            1 => ".",
            2 => "..",
            _ => "...",
        }
    }
}
