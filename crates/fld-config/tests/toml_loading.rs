//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed file and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use fld_config::FieldlineConfig;
use pretty_assertions::assert_eq;

#[test]
fn loads_service_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[service]
base_url = "https://field.example.com/api/"
api_token = "svc-token"
timeout_secs = 12
"#,
        )?;

        let config: FieldlineConfig = Figment::from(Serialized::defaults(FieldlineConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.service.base_url(), "https://field.example.com/api");
        assert_eq!(config.service.api_token, "svc-token");
        assert_eq!(config.service.timeout_secs, 12);
        assert_eq!(config.service.user_agent, "fieldline/0.1");
        Ok(())
    });
}

#[test]
fn loads_search_and_otp_sections() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[search]
debounce_ms = 150
min_query_len = 3

[otp]
ttl_secs = 120
"#,
        )?;

        let config: FieldlineConfig = Figment::from(Serialized::defaults(FieldlineConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.min_query_len, 3);
        assert_eq!(config.search.default_limit, 20);
        assert_eq!(config.otp.ttl_secs, 120);
        assert_eq!(config.otp.code_len, 6);
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".fieldline")?;
        jail.create_file(
            ".fieldline/config.toml",
            r#"
[batch]
max_items = 3
"#,
        )?;

        let config = FieldlineConfig::load().expect("config loads");
        assert_eq!(config.batch.max_items, 3);
        Ok(())
    });
}

#[test]
fn load_rejects_out_of_range_batch_size() {
    Jail::expect_with(|jail| {
        jail.create_dir(".fieldline")?;
        jail.create_file(
            ".fieldline/config.toml",
            r#"
[batch]
max_items = 9
"#,
        )?;

        let err = FieldlineConfig::load().unwrap_err();
        assert!(err.to_string().contains("batch.max_items"));
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[search]
debounce_ms = 150
"#,
        )?;
        jail.set_env("FIELDLINE_SEARCH__DEBOUNCE_MS", "500");

        let config: FieldlineConfig = Figment::from(Serialized::defaults(FieldlineConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("FIELDLINE_").split("__"))
            .extract()?;

        assert_eq!(config.search.debounce_ms, 500);
        Ok(())
    });
}
