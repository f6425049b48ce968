//! Configuration loading tests: file layering and environment overrides.

mod common;

use std::fs;

use mirrorchat::infrastructure::setup::DEFAULT_CONFIG_TEMPLATE;
use mirrorchat::ConfigLoader;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = common::temp_dir();
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_file_values_override_defaults() {
    let (_dir, path) = write_config(
        r"
study:
  per_condition_cap: 5
  max_turns: 8
server:
  port: 9100
llm:
  model: gpt-4o-mini
",
    );

    let config = temp_env::with_vars_unset(
        ["MIRRORCHAT_STUDY__PER_CONDITION_CAP", "MIRRORCHAT_SERVER__PORT"],
        || ConfigLoader::load_from_file(&path).unwrap(),
    );

    assert_eq!(config.study.per_condition_cap, 5);
    assert_eq!(config.study.max_turns, 8);
    assert_eq!(config.study.global_cap, 72);
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.study.max_input_chars, 100);
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, path) = write_config("study:\n  global_cap: 40\n");

    let config = temp_env::with_vars(
        [
            ("MIRRORCHAT_STUDY__GLOBAL_CAP", Some("20")),
            ("MIRRORCHAT_DATABASE__PATH", Some("/tmp/mirrorchat-env.db")),
            ("MIRRORCHAT_LOGGING__LEVEL", Some("debug")),
        ],
        || ConfigLoader::load_from_file(&path).unwrap(),
    );

    assert_eq!(config.study.global_cap, 20);
    assert_eq!(config.database.path, "/tmp/mirrorchat-env.db");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_invalid_environment_value_is_rejected() {
    let (_dir, path) = write_config("");

    let result = temp_env::with_var("MIRRORCHAT_STUDY__PER_CONDITION_CAP", Some("0"), || {
        ConfigLoader::load_from_file(&path)
    });
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("per_condition_cap"), "{message}");

    let result = temp_env::with_var("MIRRORCHAT_LOGGING__FORMAT", Some("xml"), || {
        ConfigLoader::load_from_file(&path)
    });
    assert!(result.is_err());
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let (_dir, path) = write_config("study: [this is not a mapping");
    assert!(ConfigLoader::load_from_file(&path).is_err());
}

#[test]
fn test_init_template_loads_as_defaults() {
    let (_dir, path) = write_config(DEFAULT_CONFIG_TEMPLATE);

    let config = temp_env::with_vars_unset(
        [
            "MIRRORCHAT_STUDY__GLOBAL_CAP",
            "MIRRORCHAT_STUDY__PER_CONDITION_CAP",
            "MIRRORCHAT_DATABASE__PATH",
            "MIRRORCHAT_LOGGING__LEVEL",
            "MIRRORCHAT_LOGGING__FORMAT",
        ],
        || ConfigLoader::load_from_file(&path).unwrap(),
    );

    assert_eq!(config.study.per_condition_cap, 18);
    assert_eq!(config.study.global_cap, 72);
    assert_eq!(config.study.max_turns, 16);
}
