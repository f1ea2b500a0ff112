//! Integration tests for environment-based configuration.

use std::time::Duration;

use channel_preview_scraper::config::{Config, ConfigError};
use serial_test::serial;

const VARS: &[&str] = &[
    "CHANNELS",
    "START_DATE",
    "END_DATE",
    "TIMEZONE",
    "COLLECT_MEDIA",
    "COLLECT_TEXT",
    "COLLECT_META",
    "OUTPUT_DIR",
    "PREVIEW_BASE_URL",
    "MAX_LOAD_ATTEMPTS",
    "REQUEST_TIMEOUT_SECS",
    "SKIP_MALFORMED_POSTS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    std::env::set_var("CHANNELS", "first,@second");
    std::env::set_var("START_DATE", "2022-02-23 00:00:00");

    let config = Config::from_env().expect("Failed to load config");
    config.validate().expect("Config should be valid");

    assert_eq!(config.channels, vec!["first".to_string(), "second".to_string()]);
    assert_eq!(config.timezone, "Europe/Kiev");
    assert_eq!(config.preview_base_url, "https://t.me/s/");
    assert!(config.end_date.is_none());
    assert!(config.collect_media && config.collect_text && config.collect_meta);
    assert_eq!(config.max_load_attempts, 500);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert!(!config.skip_malformed_posts);

    let window = config.window().unwrap();
    assert_eq!(window.start.to_rfc3339(), "2022-02-23T00:00:00+02:00");

    clear_env();
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("CHANNELS", "example");
    std::env::set_var("START_DATE", "2023-03-01");
    std::env::set_var("END_DATE", "2023-03-31 23:59:59");
    std::env::set_var("TIMEZONE", "UTC");
    std::env::set_var("COLLECT_MEDIA", "no");
    std::env::set_var("MAX_LOAD_ATTEMPTS", "10");
    std::env::set_var("SKIP_MALFORMED_POSTS", "1");

    let config = Config::from_env().expect("Failed to load config");
    config.validate().expect("Config should be valid");

    assert!(!config.collect_media);
    assert_eq!(config.max_load_attempts, 10);
    assert!(config.skip_malformed_posts);
    let window = config.window().unwrap();
    assert_eq!(window.end.unwrap().to_rfc3339(), "2023-03-31T23:59:59+00:00");

    clear_env();
}

#[test]
#[serial]
fn test_from_env_missing_required() {
    clear_env();
    std::env::set_var("CHANNELS", "example");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "START_DATE"));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_invalid_values() {
    clear_env();
    std::env::set_var("CHANNELS", "example");
    std::env::set_var("START_DATE", "2023-03-01");
    std::env::set_var("COLLECT_TEXT", "maybe");
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::ParseBool { .. })
    ));

    std::env::remove_var("COLLECT_TEXT");
    std::env::set_var("MAX_LOAD_ATTEMPTS", "lots");
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::ParseInt { .. })
    ));

    std::env::set_var("MAX_LOAD_ATTEMPTS", "0");
    let config = Config::from_env().unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));

    clear_env();
}
