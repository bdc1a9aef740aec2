//! Settings Models
//!
//! Client configuration: the two remote endpoint base URLs plus request and
//! indicator timing. Injected into the HTTP client and orchestrators at
//! construction, never read from hidden globals.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the image-analysis base URL
pub const ANALYZE_URL_ENV: &str = "VERISCOPE_ANALYZE_URL";
/// Environment variable overriding the text-verification base URL
pub const VERIFY_URL_ENV: &str = "VERISCOPE_VERIFY_URL";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the image-analysis service
    pub analyze_base_url: String,
    /// Base URL of the text-verification service
    pub verify_base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Interval of the cosmetic "Analyzing..." tick in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            analyze_base_url: "http://127.0.0.1:8080".to_string(),
            verify_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
            tick_interval_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Defaults with the two base URLs optionally overridden from the
    /// environment. The endpoints are the only environment-configurable
    /// values.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ANALYZE_URL_ENV) {
            if !url.trim().is_empty() {
                config.analyze_base_url = url;
            }
        }
        if let Ok(url) = std::env::var(VERIFY_URL_ENV) {
            if !url.trim().is_empty() {
                config.verify_base_url = url;
            }
        }
        config
    }
}
