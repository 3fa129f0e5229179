//! # fld-config
//!
//! Layered configuration loading for Fieldline using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FIELDLINE_*` prefix, `__` as separator)
//! 2. Project-level `.fieldline/config.toml`
//! 3. User-level `~/.config/fieldline/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FIELDLINE_SERVICE__BASE_URL` -> `service.base_url`,
//! `FIELDLINE_SEARCH__DEBOUNCE_MS` -> `search.debounce_ms`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use fld_config::FieldlineConfig;
//!
//! let config = FieldlineConfig::load_with_dotenv().expect("config");
//! if config.service.is_configured() {
//!     println!("API: {}", config.service.base_url());
//! }
//! ```

mod batch;
mod error;
mod general;
mod search;
mod service;

pub use batch::{BatchConfig, MAX_OTP_TTL_SECS, OtpConfig};
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use search::SearchConfig;
pub use service::ServiceConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard upper bound on batch size; configuration may only lower it.
const MAX_BATCH_ITEMS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FieldlineConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl FieldlineConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed, or
    /// [`ConfigError::InvalidValue`] if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".fieldline/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("FIELDLINE_").split("__"))
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BATCH_ITEMS).contains(&self.batch.max_items) {
            return Err(ConfigError::InvalidValue {
                field: "batch.max_items".into(),
                reason: format!("must be between 1 and {MAX_BATCH_ITEMS}"),
            });
        }
        if self.search.min_query_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.min_query_len".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.otp.code_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "otp.code_len".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(1..=MAX_OTP_TTL_SECS).contains(&self.otp.ttl_secs) {
            return Err(ConfigError::InvalidValue {
                field: "otp.ttl_secs".into(),
                reason: format!("must be between 1 and {MAX_OTP_TTL_SECS}"),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fieldline").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available), then falls back to
    /// the current directory. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = FieldlineConfig::default();
        assert!(!config.service.is_configured());
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.max_items, 5);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: FieldlineConfig = FieldlineConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.search.min_query_len, 5);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn validate_rejects_oversized_batch() {
        let mut config = FieldlineConfig::default();
        config.batch.max_items = 6;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "batch.max_items"));
    }

    #[test]
    fn validate_rejects_huge_ttl() {
        let mut config = FieldlineConfig::default();
        config.otp.ttl_secs = i64::MAX / 100;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "otp.ttl_secs"));

        config.otp.ttl_secs = MAX_OTP_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_min_query_len() {
        let mut config = FieldlineConfig::default();
        config.search.min_query_len = 0;
        assert!(config.validate().is_err());
    }
}
