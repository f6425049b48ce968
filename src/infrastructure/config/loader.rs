use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid per_condition_cap: {0}. Must be at least 1")]
    InvalidPerConditionCap(u32),

    #[error("Invalid global_cap: {0}. Must be at least 1")]
    InvalidGlobalCap(u32),

    #[error("Invalid max_turns: {0}. Must be at least 1")]
    InvalidMaxTurns(u32),

    #[error("Invalid max_input_chars: {0}. Must be at least 1")]
    InvalidMaxInputChars(usize),

    #[error("Invalid allocation_attempts: {0}. Cannot be 0")]
    InvalidAllocationAttempts(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid temperature for {field}: {value}. Must be between 0.0 and 2.0")]
    InvalidTemperature { field: &'static str, value: f32 },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    pub const PROJECT_CONFIG: &'static str = ".mirrorchat/config.yaml";
    pub const LOCAL_CONFIG: &'static str = ".mirrorchat/local.yaml";
    pub const ENV_PREFIX: &'static str = "MIRRORCHAT_";

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mirrorchat/config.yaml (project config, written by init)
    /// 3. .mirrorchat/local.yaml (local overrides, optional)
    /// 4. Environment variables (MIRRORCHAT_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(Self::PROJECT_CONFIG))
            .merge(Yaml::file(Self::LOCAL_CONFIG))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .context(format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let study = &config.study;
        if study.per_condition_cap == 0 {
            return Err(ConfigError::InvalidPerConditionCap(study.per_condition_cap));
        }
        if study.global_cap == 0 {
            return Err(ConfigError::InvalidGlobalCap(study.global_cap));
        }
        if study.max_turns == 0 {
            return Err(ConfigError::InvalidMaxTurns(study.max_turns));
        }
        if study.max_input_chars == 0 {
            return Err(ConfigError::InvalidMaxInputChars(study.max_input_chars));
        }
        if study.allocation_attempts == 0 {
            return Err(ConfigError::InvalidAllocationAttempts(study.allocation_attempts));
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

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
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        for (field, value) in [
            ("llm.keyword_temperature", config.llm.keyword_temperature),
            ("llm.mirror_temperature", config.llm.mirror_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::InvalidTemperature { field, value });
            }
        }

        if config.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("llm.model cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.study.per_condition_cap, 18);
        assert_eq!(config.study.global_cap, 72);
        assert_eq!(config.study.max_turns, 16);
        assert_eq!(config.study.max_input_chars, 100);
        assert_eq!(config.database.path, ".mirrorchat/mirrorchat.db");
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
study:
  per_condition_cap: 10
  global_cap: 40
database:
  path: /custom/path.db
logging:
  level: debug
  format: json
llm:
  model: gpt-4o-mini
  mirror_temperature: 0.7
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.study.per_condition_cap, 10);
        assert_eq!(config.study.global_cap, 40);
        assert_eq!(config.study.max_turns, 16);
        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!((config.llm.mirror_temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.llm.keyword_max_tokens, 30);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_caps() {
        let mut config = Config::default();
        config.study.per_condition_cap = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPerConditionCap(0))
        ));

        let mut config = Config::default();
        config.study.global_cap = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidGlobalCap(0))
        ));
    }

    #[test]
    fn test_validate_zero_turns() {
        let mut config = Config::default();
        config.study.max_turns = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxTurns(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut config = Config::default();
        config.llm.mirror_temperature = 3.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTemperature { field: "llm.mirror_temperature", .. })
        ));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "study:\n  global_cap: 40\nserver:\n  port: 9000\n").unwrap();

        temp_env::with_var("MIRRORCHAT_SERVER__PORT", Some("9100"), || {
            let config = ConfigLoader::load_from_file(&path).unwrap();
            assert_eq!(config.study.global_cap, 40);
            assert_eq!(config.server.port, 9100);
        });
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "study:\n  max_turns: 0\n").unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }
}
