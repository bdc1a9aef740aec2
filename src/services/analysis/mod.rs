//! Analysis Backend
//!
//! The remote media-analysis boundary: an object-safe async trait the
//! orchestrators depend on, its typed error taxonomy, and the reqwest
//! implementation speaking to the two remote services.

pub mod backend;
pub mod http;

pub use backend::{AnalysisBackend, AnalysisError, AnalysisResult};
pub use http::HttpAnalysisClient;
