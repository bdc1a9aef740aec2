//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod analysis;
pub mod conversation;
pub mod settings;

pub use analysis::*;
pub use conversation::*;
pub use settings::*;
