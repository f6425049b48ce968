//! Mirrorchat setup and wiring
//!
//! Handles:
//! - The default configuration file written by `init`
//! - Assembling the dialogue service from configuration and a database pool

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::llm::{OpenAiChatConfig, OpenAiChatGenerator};
use crate::adapters::sqlite::{SqliteLedgerRepository, SqliteTranscriptRepository};
use crate::domain::models::Config;
use crate::domain::ports::TextGenerator;
use crate::services::{AllocationService, DialogueService, MirroringParams, MirroringService};

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Mirrorchat Configuration
# Override settings by editing this file, adding .mirrorchat/local.yaml, or
# setting environment variables with the MIRRORCHAT_ prefix
#
# Example environment variables:
#   export MIRRORCHAT_STUDY__GLOBAL_CAP=40
#   export MIRRORCHAT_SERVER__PORT=9000
#   export MIRRORCHAT_LLM__API_KEY=sk-...
#   export MIRRORCHAT_LOGGING__LEVEL=debug

# Study design
study:
  # Participants per condition (A-D)
  per_condition_cap: 18

  # Participants across all four conditions
  global_cap: 72

  # Counted turns before the session completes
  max_turns: 16

  # Longest accepted utterance, in characters
  max_input_chars: 100

  # Random characters after the condition letter in participant IDs
  participant_suffix_len: 7

  # Snapshot-and-claim rounds before allocation gives up under contention
  allocation_attempts: 5

  # Base delay between allocation rounds in milliseconds
  allocation_backoff_ms: 20

# Database configuration
database:
  # Path to SQLite database file (project-local)
  path: ".mirrorchat/mirrorchat.db"

  # Maximum number of database connections in pool
  max_connections: 5

# Chat server
server:
  host: "127.0.0.1"
  port: 8501
  enable_cors: true

# OpenAI-compatible text-generation API (mirroring conditions only)
llm:
  base_url: "https://api.openai.com/v1"
  model: "gpt-4-1106-preview"
  # Falls back to the OPENAI_API_KEY environment variable when unset
  # api_key: "sk-..."
  timeout_secs: 30
  keyword_temperature: 0.0
  keyword_max_tokens: 30
  mirror_temperature: 0.5
  mirror_max_tokens: 80

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "pretty"

  # Directory for rolling JSON log files (stderr only when unset)
  # log_dir: ".mirrorchat/logs"

  # Rotation: daily, hourly, never
  rotation: "daily"
"#;

/// Assemble the dialogue service over a migrated pool and the configured generator.
pub fn build_dialogue_service(config: &Config, pool: SqlitePool) -> Result<Arc<DialogueService>> {
    let generator: Arc<dyn TextGenerator> = Arc::new(
        OpenAiChatGenerator::new(OpenAiChatConfig::from(&config.llm))
            .context("Failed to create text-generation client")?,
    );
    Ok(build_dialogue_service_with(config, pool, generator))
}

/// Same as [`build_dialogue_service`] with an explicit generator.
pub fn build_dialogue_service_with(
    config: &Config,
    pool: SqlitePool,
    generator: Arc<dyn TextGenerator>,
) -> Arc<DialogueService> {
    let allocation = AllocationService::new(
        Arc::new(SqliteLedgerRepository::new(pool.clone())),
        &config.study,
    );
    let mirroring = MirroringService::new(generator, MirroringParams::from(&config.llm));

    Arc::new(DialogueService::new(
        allocation,
        mirroring,
        Arc::new(SqliteTranscriptRepository::new(pool)),
        &config.study,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[test]
    fn test_template_matches_defaults() {
        let parsed: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.study.per_condition_cap, defaults.study.per_condition_cap);
        assert_eq!(parsed.study.global_cap, defaults.study.global_cap);
        assert_eq!(parsed.study.max_turns, defaults.study.max_turns);
        assert_eq!(parsed.database.path, defaults.database.path);
        assert_eq!(parsed.server.port, defaults.server.port);
        assert_eq!(parsed.llm.model, defaults.llm.model);
        assert!(parsed.llm.api_key.is_none());
        assert_eq!(parsed.logging.format, defaults.logging.format);
        ConfigLoader::validate(&parsed).unwrap();
    }

    #[tokio::test]
    async fn test_wiring_requires_an_api_key() {
        let pool = crate::adapters::sqlite::create_migrated_test_pool().await.unwrap();
        let config = Config::default();
        assert!(config.llm.api_key.is_none());

        let result = temp_env::with_var_unset("OPENAI_API_KEY", || build_dialogue_service(&config, pool.clone()));
        assert!(result.is_err());

        let mut keyed = Config::default();
        keyed.llm.api_key = Some("sk-test-0123456789abcdefghij".to_string());
        assert!(build_dialogue_service(&keyed, pool).is_ok());
    }
}
