//! Services
//!
//! Business logic services for the application: the analysis backend
//! boundary and the two per-session orchestrators.

pub mod analysis;
pub mod conversation;
pub mod image_session;

pub use analysis::{AnalysisBackend, AnalysisError, HttpAnalysisClient};
pub use conversation::Conversation;
pub use image_session::ImageSession;
