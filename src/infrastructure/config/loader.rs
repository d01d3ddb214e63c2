use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::{TemperatureSchedule, MAX_TEMPERATURE};

/// Directory holding project configuration.
pub const CONFIG_DIR: &str = ".thicket";

/// Prefix of environment overrides; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "THICKET_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name}: {value}. Must be at least 1")]
    ZeroParameter { name: &'static str, value: usize },

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid timeout: {0} must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid {name}: {value}. Must be between 0 and {MAX_TEMPERATURE}")]
    InvalidTemperature { name: &'static str, value: f32 },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Oracle base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Report directory cannot be empty")]
    EmptyReportDir,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .thicket/config.yaml (project config, created by init)
    /// 3. .thicket/local.yaml (project local overrides, optional)
    /// 4. Environment variables (THICKET_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same as [`ConfigLoader::load`] with the project files read from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file instead of the project files.
    /// Environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Path `thicket init` writes the default configuration to.
    pub fn project_config_path() -> PathBuf {
        Path::new(CONFIG_DIR).join("config.yaml")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Oracle
        if config.oracle.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if config.oracle.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("oracle.timeout_secs"));
        }
        if config.oracle.synthesis_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("oracle.synthesis_timeout_secs"));
        }
        if config.oracle.health_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("oracle.health_timeout_secs"));
        }
        if config.oracle.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "oracle.max_tokens must be at least 1".to_string(),
            ));
        }

        // Rate limit and retry
        if config.rate_limit.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(
                config.rate_limit.requests_per_second,
            ));
        }
        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        // Reasoning
        check_temperature(
            "reasoning.decomposition_temperature",
            config.reasoning.decomposition_temperature,
        )?;
        check_temperature(
            "reasoning.evaluation_temperature",
            config.reasoning.evaluation_temperature,
        )?;
        check_temperature(
            "reasoning.synthesis_temperature",
            config.reasoning.synthesis_temperature,
        )?;
        if config.reasoning.max_steps == Some(0) {
            return Err(ConfigError::ZeroParameter {
                name: "reasoning.max_steps",
                value: 0,
            });
        }

        // Search
        let search = &config.search;
        for (name, value) in [
            ("search.amplitude", search.amplitude),
            ("search.bfs_branching_factor", search.bfs_branching_factor),
            ("search.beam_branching_factor", search.beam_branching_factor),
            ("search.beam_width", search.beam_width),
            ("search.max_concurrency", search.max_concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroParameter { name, value });
            }
        }
        check_schedule("search.bfs_temperature", search.bfs_temperature)?;
        check_schedule("search.beam_temperature", search.beam_temperature)?;

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        // Report
        if config.report.directory.as_os_str().is_empty() {
            return Err(ConfigError::EmptyReportDir);
        }
        if config.report.top_n == 0 {
            return Err(ConfigError::ZeroParameter {
                name: "report.top_n",
                value: 0,
            });
        }

        Ok(())
    }
}

fn check_temperature(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=MAX_TEMPERATURE).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTemperature { name, value })
    }
}

fn check_schedule(name: &'static str, schedule: TemperatureSchedule) -> Result<(), ConfigError> {
    check_temperature(name, schedule.base)?;
    if schedule.increment < 0.0 {
        return Err(ConfigError::ValidationFailed(format!(
            "{name}.increment must not be negative"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!((config.rate_limit.requests_per_second - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "warn");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
oracle:
  base_url: http://127.0.0.1:8080/v1
  model: qwen2.5-7b-instruct
search:
  amplitude: 5
  max_concurrency: 2
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.oracle.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.oracle.model.as_deref(), Some("qwen2.5-7b-instruct"));
        assert_eq!(config.search.amplitude, 5);
        assert_eq!(config.search.max_concurrency, 2);
        assert_eq!(config.logging.level, "debug");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_branching_factor() {
        let mut config = Config::default();
        config.search.beam_branching_factor = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroParameter {
                name: "search.beam_branching_factor",
                value: 0
            })
        ));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = Config::default();
        config.search.max_concurrency = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_zero_max_steps() {
        let mut config = Config::default();
        config.reasoning.max_steps = Some(0);
        assert!(ConfigLoader::validate(&config).is_err());

        config.reasoning.max_steps = Some(2);
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_zero_rate_limit() {
        let mut config = Config::default();
        config.rate_limit.requests_per_second = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRateLimit(_))
        ));
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 30000;
        config.retry.max_backoff_ms = 10000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(30000, 10000))
        ));
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut config = Config::default();
        config.reasoning.evaluation_temperature = 2.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTemperature {
                name: "reasoning.evaluation_temperature",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.oracle.timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout("oracle.timeout_secs"))
        ));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.oracle.base_url = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyBaseUrl)
        ));
    }
}
