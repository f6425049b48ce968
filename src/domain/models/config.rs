use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ledger::AllocationCaps;
use super::session::SessionLimits;

/// Main configuration structure for mirrorchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Allocation caps and dialogue limits
    #[serde(default)]
    pub study: StudyConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Text-generation API configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Study design parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StudyConfig {
    /// Participants allowed per condition
    #[serde(default = "default_per_condition_cap")]
    pub per_condition_cap: u32,

    /// Participants allowed across all conditions
    #[serde(default = "default_global_cap")]
    pub global_cap: u32,

    /// Counted turns before a session completes
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Longest accepted utterance, in characters
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Random characters after the condition letter in participant IDs
    #[serde(default = "default_participant_suffix_len")]
    pub participant_suffix_len: usize,

    /// Snapshot-and-claim rounds before allocation gives up
    #[serde(default = "default_allocation_attempts")]
    pub allocation_attempts: u32,

    /// Base delay between allocation rounds in milliseconds
    #[serde(default = "default_allocation_backoff_ms")]
    pub allocation_backoff_ms: u64,
}

const fn default_per_condition_cap() -> u32 {
    18
}

const fn default_global_cap() -> u32 {
    72
}

const fn default_max_turns() -> u32 {
    16
}

const fn default_max_input_chars() -> usize {
    100
}

const fn default_participant_suffix_len() -> usize {
    7
}

const fn default_allocation_attempts() -> u32 {
    5
}

const fn default_allocation_backoff_ms() -> u64 {
    20
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            per_condition_cap: default_per_condition_cap(),
            global_cap: default_global_cap(),
            max_turns: default_max_turns(),
            max_input_chars: default_max_input_chars(),
            participant_suffix_len: default_participant_suffix_len(),
            allocation_attempts: default_allocation_attempts(),
            allocation_backoff_ms: default_allocation_backoff_ms(),
        }
    }
}

impl StudyConfig {
    pub fn caps(&self) -> AllocationCaps {
        AllocationCaps {
            per_condition: self.per_condition_cap,
            global: self.global_cap,
        }
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_turns: self.max_turns,
            max_input_chars: self.max_input_chars,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".mirrorchat/mirrorchat.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Chat HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8501
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_true(),
        }
    }
}

/// Text-generation API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub keyword_temperature: f32,

    #[serde(default = "default_keyword_max_tokens")]
    pub keyword_max_tokens: u32,

    #[serde(default = "default_mirror_temperature")]
    pub mirror_temperature: f32,

    #[serde(default = "default_mirror_max_tokens")]
    pub mirror_max_tokens: u32,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4-1106-preview".to_string()
}

const fn default_llm_timeout_secs() -> u64 {
    30
}

const fn default_keyword_max_tokens() -> u32 {
    30
}

const fn default_mirror_temperature() -> f32 {
    0.5
}

const fn default_mirror_max_tokens() -> u32 {
    80
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
            keyword_temperature: 0.0,
            keyword_max_tokens: default_keyword_max_tokens(),
            mirror_temperature: default_mirror_temperature(),
            mirror_max_tokens: default_mirror_max_tokens(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
