use figment::Jail;
use fld_config::FieldlineConfig;
use pretty_assertions::assert_eq;

#[test]
fn env_sets_service_section() {
    Jail::expect_with(|jail| {
        jail.set_env("FIELDLINE_SERVICE__BASE_URL", "https://env.example.com");
        jail.set_env("FIELDLINE_SERVICE__API_TOKEN", "tok-env");

        let config = FieldlineConfig::load().expect("config loads");
        assert!(config.service.is_configured());
        assert_eq!(config.service.base_url, "https://env.example.com");
        assert_eq!(config.service.api_token, "tok-env");
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".fieldline")?;
        jail.create_file(
            ".fieldline/config.toml",
            r#"
[otp]
code_len = 4
"#,
        )?;
        jail.set_env("FIELDLINE_OTP__CODE_LEN", "8");

        let config = FieldlineConfig::load().expect("config loads");
        assert_eq!(config.otp.code_len, 8);
        Ok(())
    });
}
