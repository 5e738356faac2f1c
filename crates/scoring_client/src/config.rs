//! Scoring service configuration

use core_kernel::CircuitBreakerConfig;

/// Configuration for the scoring service adapter
///
/// The inference service runs alongside the property server (typically on
/// localhost) and authenticates feature access with a license key.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Base URL of the inference API (e.g., "http://127.0.0.1:8000")
    pub base_url: String,

    /// License key sent with every scoring request
    pub license_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Circuit breaker configuration; None disables the breaker
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            license_key: String::new(),
            timeout_secs: 30,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

impl ScoringConfig {
    /// Creates a configuration for the given base URL and license key
    pub fn new(base_url: impl Into<String>, license_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            license_key: license_key.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
