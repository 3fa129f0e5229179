//! Batch size and one-time-code settings.

use serde::{Deserialize, Serialize};

/// Longest accepted one-time-code lifetime, in seconds.
pub const MAX_OTP_TTL_SECS: i64 = 86_400;

const fn default_max_items() -> usize {
    5
}

const fn default_ttl_secs() -> i64 {
    300
}

const fn default_code_len() -> usize {
    6
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Maximum number of items in one installation batch (1..=5).
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Lifetime of a one-time code, in seconds (1..=[`MAX_OTP_TTL_SECS`]).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,

    /// Number of digits in a one-time code.
    #[serde(default = "default_code_len")]
    pub code_len: usize,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            code_len: default_code_len(),
        }
    }
}
