//! SQLite implementation of the LedgerRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AllocationCaps, Condition, LedgerRow, LedgerSnapshot};
use crate::domain::ports::LedgerRepository;

#[derive(Clone)]
pub struct SqliteLedgerRepository {
    pool: SqlitePool,
}

impl SqliteLedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerRowRecord {
    tone: String,
    mirroring: String,
    count: i64,
}

fn record_to_row(record: LedgerRowRecord) -> DomainResult<LedgerRow> {
    let condition = Condition::from_labels(&record.tone, &record.mirroring)?;
    let count = u32::try_from(record.count).map_err(|_| {
        DomainError::SerializationError(format!(
            "Invalid ledger count {} for {}",
            record.count, condition
        ))
    })?;
    Ok(LedgerRow { condition, count })
}

#[async_trait]
impl LedgerRepository for SqliteLedgerRepository {
    async fn snapshot(&self) -> DomainResult<LedgerSnapshot> {
        let records: Vec<LedgerRowRecord> =
            sqlx::query_as("SELECT tone, mirroring, count FROM allocation_ledger ORDER BY letter")
                .fetch_all(&self.pool)
                .await?;

        let rows = records
            .into_iter()
            .map(record_to_row)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(LedgerSnapshot::new(rows))
    }

    async fn try_claim(&self, condition: Condition, caps: &AllocationCaps) -> DomainResult<bool> {
        // Both caps are re-checked inside the single UPDATE, so concurrent
        // claims cannot increment from a stale count.
        let result = sqlx::query(
            r#"UPDATE allocation_ledger
               SET count = count + 1, updated_at = datetime('now')
               WHERE tone = ? AND mirroring = ? AND count < ?
                 AND (SELECT COALESCE(SUM(count), 0) FROM allocation_ledger) < ?"#,
        )
        .bind(condition.tone.label())
        .bind(condition.mirroring.label())
        .bind(i64::from(caps.per_condition))
        .bind(i64::from(caps.global))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::{Mirroring, Tone};

    async fn setup() -> (SqlitePool, SqliteLedgerRepository) {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteLedgerRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_seeded_ledger_has_four_empty_rows() {
        let (_pool, repo) = setup().await;
        let snapshot = repo.snapshot().await.unwrap();
        assert_eq!(snapshot.rows.len(), 4);
        assert_eq!(snapshot.total(), 0);
        let letters: String = snapshot.rows.iter().map(|r| r.condition.letter()).collect();
        assert_eq!(letters, "ABCD");
    }

    #[tokio::test]
    async fn test_claim_increments_one_row() {
        let (_pool, repo) = setup().await;
        let d = Condition::new(Tone::Formal, Mirroring::Predicate);

        assert!(repo.try_claim(d, &AllocationCaps::default()).await.unwrap());
        assert!(repo.try_claim(d, &AllocationCaps::default()).await.unwrap());

        let snapshot = repo.snapshot().await.unwrap();
        assert_eq!(snapshot.count_for(d), Some(2));
        assert_eq!(snapshot.total(), 2);
    }

    #[tokio::test]
    async fn test_claim_refused_at_per_condition_cap() {
        let (_pool, repo) = setup().await;
        let a = Condition::new(Tone::Informal, Mirroring::None);
        let caps = AllocationCaps { per_condition: 2, global: 72 };

        assert!(repo.try_claim(a, &caps).await.unwrap());
        assert!(repo.try_claim(a, &caps).await.unwrap());
        assert!(!repo.try_claim(a, &caps).await.unwrap());
        assert_eq!(repo.snapshot().await.unwrap().count_for(a), Some(2));
    }

    #[tokio::test]
    async fn test_claim_refused_at_global_cap() {
        let (_pool, repo) = setup().await;
        let caps = AllocationCaps { per_condition: 18, global: 3 };
        for condition in Condition::ALL.iter().take(3) {
            assert!(repo.try_claim(*condition, &caps).await.unwrap());
        }
        let last = Condition::ALL[3];
        assert!(!repo.try_claim(last, &caps).await.unwrap());
        assert_eq!(repo.snapshot().await.unwrap().total(), 3);
    }

    #[tokio::test]
    async fn test_counts_cannot_decrease() {
        let (pool, repo) = setup().await;
        let b = Condition::new(Tone::Informal, Mirroring::Predicate);
        repo.try_claim(b, &AllocationCaps::default()).await.unwrap();

        let result = sqlx::query("UPDATE allocation_ledger SET count = 0 WHERE letter = 'B'")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
