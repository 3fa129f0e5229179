//! Remote field-service API configuration.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "fieldline/0.1".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL of the field-service API (e.g. `https://api.example.com/v1`).
    #[serde(default)]
    pub base_url: String,

    /// Bearer token for the API. Empty sends unauthenticated requests.
    #[serde(default)]
    pub api_token: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServiceConfig {
    /// Check if the minimum required fields for remote access are set.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
