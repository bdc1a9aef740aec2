//! Utilities
//!
//! Shared helpers used across the crate.

pub mod error;

pub use error::{AppError, AppResult};
