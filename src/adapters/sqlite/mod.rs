//! SQLite storage for the allocation ledger and transcript sheets.

pub mod connection;
pub mod ledger_repository;
pub mod migrations;
pub mod transcript_repository;

pub use connection::{create_memory_pool, create_pool, ConnectionError, PoolConfig};
pub use ledger_repository::SqliteLedgerRepository;
pub use migrations::{MigrationError, SchemaMigrator, SchemaScript, SCHEMA_SCRIPTS};
pub use transcript_repository::SqliteTranscriptRepository;

use sqlx::SqlitePool;

use crate::domain::models::DatabaseConfig;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Open the database at `database_url` and bring its schema up to date.
pub async fn initialize_database_with(database_url: &str, pool_config: PoolConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, &pool_config).await?;
    SchemaMigrator::new(pool.clone()).migrate().await?;
    Ok(pool)
}

/// Open and migrate the database described by the configuration.
pub async fn initialize_from_config(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool_config = PoolConfig::default().with_max_connections(config.max_connections);
    initialize_database_with(&config.url(), pool_config).await
}

/// Migrated in-memory database, for tests.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_memory_pool().await?;
    SchemaMigrator::new(pool.clone()).migrate().await?;
    Ok(pool)
}
