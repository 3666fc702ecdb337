//! Engine configuration

use serde::{Deserialize, Serialize};

/// Confidence level used when a caller does not pass one
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Settings for a [`SignificanceEngine`](crate::SignificanceEngine)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Level for `confidence_interval()` and `margin_of_error()`
    pub confidence_level: f64,
    /// Memoize the p-value until the next append
    pub cache_p_value: bool,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            cache_p_value: false,
        }
    }
}

impl SignificanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn with_p_value_cache(mut self, enabled: bool) -> Self {
        self.cache_p_value = enabled;
        self
    }
}
