//! Schema versioning for the study database.
//!
//! Scripts are compiled into the binary and applied in version order, each in
//! its own transaction together with its `schema_version` row. After the run
//! the ledger must hold exactly one row per condition.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::domain::models::Condition;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Schema script {version} failed: {source}")]
    ScriptFailed {
        version: i64,
        #[source]
        source: sqlx::Error,
    },

    #[error("Could not read schema version: {0}")]
    VersionUnreadable(#[source] sqlx::Error),

    #[error("Allocation ledger has {found} rows, expected {expected}")]
    LedgerIncomplete { found: i64, expected: usize },
}

/// One embedded schema script.
#[derive(Debug, Clone, Copy)]
pub struct SchemaScript {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Every schema script the server knows, oldest first.
pub const SCHEMA_SCRIPTS: &[SchemaScript] = &[SchemaScript {
    version: 1,
    name: "allocation ledger and transcript sheets",
    sql: include_str!("../../../migrations/001_initial_schema.sql"),
}];

/// Applies pending schema scripts to a pool.
pub struct SchemaMigrator {
    pool: SqlitePool,
}

impl SchemaMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every script newer than the stored version, returning how many ran.
    pub async fn migrate(&self) -> Result<usize, MigrationError> {
        self.migrate_with(SCHEMA_SCRIPTS).await
    }

    pub async fn migrate_with(&self, scripts: &[SchemaScript]) -> Result<usize, MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|source| MigrationError::ScriptFailed { version: 0, source })?;

        let current = self.version().await?;
        let mut applied = 0;
        for script in scripts.iter().filter(|s| s.version > current) {
            self.apply(script).await?;
            tracing::info!(version = script.version, name = script.name, "schema script applied");
            applied += 1;
        }

        self.check_ledger().await?;
        Ok(applied)
    }

    /// Highest applied script version, 0 for a fresh database.
    pub async fn version(&self) -> Result<i64, MigrationError> {
        let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .map_err(MigrationError::VersionUnreadable)?;
        Ok(version)
    }

    async fn apply(&self, script: &SchemaScript) -> Result<(), MigrationError> {
        let failed = |source| MigrationError::ScriptFailed { version: script.version, source };

        let mut tx = self.pool.begin().await.map_err(failed)?;
        sqlx::raw_sql(script.sql).execute(&mut *tx).await.map_err(failed)?;
        sqlx::query("INSERT INTO schema_version (version, name) VALUES (?, ?)")
            .bind(script.version)
            .bind(script.name)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)
    }

    async fn check_ledger(&self) -> Result<(), MigrationError> {
        let (found,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM allocation_ledger")
            .fetch_one(&self.pool)
            .await
            .map_err(MigrationError::VersionUnreadable)?;
        let expected = Condition::ALL.len();
        if usize::try_from(found).ok() != Some(expected) {
            return Err(MigrationError::LedgerIncomplete { found, expected });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_memory_pool;

    #[tokio::test]
    async fn test_fresh_database_gets_seeded_ledger() {
        let pool = create_memory_pool().await.unwrap();
        let migrator = SchemaMigrator::new(pool.clone());

        assert_eq!(migrator.migrate().await.unwrap(), 1);
        assert_eq!(migrator.version().await.unwrap(), 1);

        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT letter, count FROM allocation_ledger ORDER BY letter")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 0),
                ("C".to_string(), 0),
                ("D".to_string(), 0)
            ]
        );
    }

    #[tokio::test]
    async fn test_rerun_keeps_existing_counts() {
        let pool = create_memory_pool().await.unwrap();
        let migrator = SchemaMigrator::new(pool.clone());
        migrator.migrate().await.unwrap();

        sqlx::query("UPDATE allocation_ledger SET count = 7 WHERE letter = 'C'")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(migrator.migrate().await.unwrap(), 0);

        let (count,): (i64,) = sqlx::query_as("SELECT count FROM allocation_ledger WHERE letter = 'C'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_missing_ledger_rows_are_reported() {
        let pool = create_memory_pool().await.unwrap();
        let broken = [SchemaScript {
            version: 1,
            name: "empty ledger",
            sql: "CREATE TABLE allocation_ledger (letter TEXT PRIMARY KEY, count INTEGER NOT NULL)",
        }];

        let err = SchemaMigrator::new(pool).migrate_with(&broken).await.unwrap_err();
        assert!(matches!(err, MigrationError::LedgerIncomplete { found: 0, expected: 4 }));
    }
}
