//! Candidate lookup configuration (serial and customer search boxes).

use serde::{Deserialize, Serialize};

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_min_query_len() -> usize {
    5
}

const fn default_limit() -> usize {
    20
}

const fn default_customer_page_size() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Quiet window that collapses bursts of keystrokes into one request.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Queries shorter than this never reach the network.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Size of the default listing and of each serial lookup.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Page size for paginated customer search.
    #[serde(default = "default_customer_page_size")]
    pub customer_page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            default_limit: default_limit(),
            customer_page_size: default_customer_page_size(),
        }
    }
}

impl SearchConfig {
    pub const fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = SearchConfig::default();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.min_query_len, 5);
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.debounce(), std::time::Duration::from_millis(300));
    }
}
