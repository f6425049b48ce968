//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use mirrorchat::adapters::llm::MockTextGenerator;
use mirrorchat::adapters::sqlite::{create_migrated_test_pool, initialize_database_with, PoolConfig};
use mirrorchat::domain::models::{Config, StudyConfig};
use mirrorchat::infrastructure::setup::build_dialogue_service_with;
use mirrorchat::DialogueService;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create a temporary test database path
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("study.db");
    (dir, db_path)
}

/// Fresh in-memory database with migrations applied.
pub async fn setup_test_db() -> SqlitePool {
    create_migrated_test_pool()
        .await
        .expect("failed to create test database")
}

/// File-backed database with several connections, for concurrency tests.
///
/// Keep the returned TempDir alive for the duration of the test.
pub async fn setup_file_db(max_connections: u32) -> (TempDir, SqlitePool) {
    let (dir, path) = temp_db_path();
    let url = format!("sqlite:{}", path.display());
    let pool = initialize_database_with(&url, PoolConfig::default().with_max_connections(max_connections))
        .await
        .expect("failed to create file database");
    (dir, pool)
}

/// Set a ledger cell directly, bypassing allocation.
pub async fn seed_count(pool: &SqlitePool, letter: char, count: u32) {
    sqlx::query("UPDATE allocation_ledger SET count = ? WHERE letter = ?")
        .bind(i64::from(count))
        .bind(letter.to_string())
        .execute(pool)
        .await
        .expect("failed to seed ledger");
}

/// Configuration with the given study parameters and defaults elsewhere.
pub fn config_with(study: StudyConfig) -> Config {
    Config {
        study,
        ..Config::default()
    }
}

/// Dialogue service over `pool` with a scripted generator.
pub fn dialogue(pool: SqlitePool, config: &Config, generator: Arc<MockTextGenerator>) -> Arc<DialogueService> {
    build_dialogue_service_with(config, pool, generator)
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
