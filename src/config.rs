use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::channel::{ScrapeOptions, DEFAULT_MAX_LOAD_ATTEMPTS};
use crate::constants::DEFAULT_PREVIEW_BASE_URL;
use crate::error::ScrapeError;
use crate::feed::preview::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::post::ExtractOptions;
use crate::window::{parse_timezone, ScrapeWindow, DEFAULT_TIMEZONE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("invalid scrape window: {0}")]
    Window(#[from] ScrapeError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Channels
    pub channels: Vec<String>,
    pub preview_base_url: String,

    // Window
    pub start_date: String,
    pub end_date: Option<String>,
    pub timezone: String,

    // Field groups
    pub collect_media: bool,
    pub collect_text: bool,
    pub collect_meta: bool,

    // Loading
    pub max_load_attempts: u32,
    pub request_timeout: Duration,
    pub skip_malformed_posts: bool,

    // Output
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Channels
            channels: parse_channel_list(&required_env("CHANNELS")?),
            preview_base_url: env_or_default("PREVIEW_BASE_URL", DEFAULT_PREVIEW_BASE_URL),

            // Window
            start_date: required_env("START_DATE")?,
            end_date: optional_env("END_DATE"),
            timezone: env_or_default("TIMEZONE", DEFAULT_TIMEZONE),

            // Field groups
            collect_media: parse_env_bool("COLLECT_MEDIA", true)?,
            collect_text: parse_env_bool("COLLECT_TEXT", true)?,
            collect_meta: parse_env_bool("COLLECT_META", true)?,

            // Loading
            max_load_attempts: parse_env_u32("MAX_LOAD_ATTEMPTS", DEFAULT_MAX_LOAD_ATTEMPTS)?,
            request_timeout: Duration::from_secs(parse_env_u64(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            skip_malformed_posts: parse_env_bool("SKIP_MALFORMED_POSTS", false)?,

            // Output
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", "./data")),
        })
    }

    /// Configuration with defaults and no channels, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            channels: Vec::new(),
            preview_base_url: DEFAULT_PREVIEW_BASE_URL.to_string(),
            start_date: "2023-01-01".to_string(),
            end_date: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            collect_media: true,
            collect_text: true,
            collect_meta: true,
            max_load_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            skip_malformed_posts: false,
            output_dir: PathBuf::from("./data"),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CHANNELS".to_string(),
                message: "must name at least one channel".to_string(),
            });
        }
        if self.max_load_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_LOAD_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if url::Url::parse(&self.preview_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "PREVIEW_BASE_URL".to_string(),
                message: format!("'{}' is not a URL", self.preview_base_url),
            });
        }
        parse_timezone(&self.timezone)?;
        self.window()?;
        Ok(())
    }

    /// Resolve the configured dates into a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the dates or timezone are invalid.
    pub fn window(&self) -> Result<ScrapeWindow, ConfigError> {
        Ok(ScrapeWindow::parse(
            &self.start_date,
            self.end_date.as_deref(),
            &self.timezone,
        )?)
    }

    #[must_use]
    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            extract: ExtractOptions {
                collect_media: self.collect_media,
                collect_text: self.collect_text,
                collect_meta: self.collect_meta,
            },
            max_load_attempts: self.max_load_attempts,
            skip_malformed_posts: self.skip_malformed_posts,
        }
    }

    /// Where the result for `channel` is written.
    #[must_use]
    pub fn output_path(&self, channel: &str) -> PathBuf {
        self.output_dir.join(format!("{channel}.json"))
    }
}

fn parse_channel_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('@'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_list() {
        assert_eq!(
            parse_channel_list(" first, @second ,,third"),
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
        assert!(parse_channel_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_env_bool("NONEXISTENT_VAR", true).unwrap());
        assert!(!parse_env_bool("NONEXISTENT_VAR", false).unwrap());
    }

    #[test]
    fn test_validate_requires_channels() {
        let config = Config::for_testing();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let config = Config {
            channels: vec!["example".to_string()],
            ..Config::for_testing()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_window() {
        let config = Config {
            channels: vec!["example".to_string()],
            start_date: "2023-03-10".to_string(),
            end_date: Some("2023-03-01".to_string()),
            ..Config::for_testing()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Window(_))));

        let config = Config {
            channels: vec!["example".to_string()],
            timezone: "Nowhere/Special".to_string(),
            ..Config::for_testing()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Window(_))));
    }

    #[test]
    fn test_scrape_options_and_output_path() {
        let config = Config {
            collect_media: false,
            skip_malformed_posts: true,
            output_dir: PathBuf::from("/tmp/out"),
            ..Config::for_testing()
        };
        let options = config.scrape_options();
        assert!(!options.extract.collect_media);
        assert!(options.extract.collect_text);
        assert!(options.skip_malformed_posts);
        assert_eq!(config.output_path("example"), PathBuf::from("/tmp/out/example.json"));
    }
}
