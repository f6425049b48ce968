//! Condition allocation over the shared ledger.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AllocationCaps, AllocationOutcome, Condition, LedgerSnapshot, StudyConfig};
use crate::domain::ports::LedgerRepository;

/// Assigns each new participant one condition below its cap.
///
/// The pick is made on a snapshot, but the claim is a conditional increment
/// in the store, so two sessions racing for the last slot of a cell cannot
/// both win. The loser re-reads the ledger and tries again.
pub struct AllocationService {
    ledger: Arc<dyn LedgerRepository>,
    caps: AllocationCaps,
    attempts: u32,
    backoff: Duration,
}

impl AllocationService {
    pub fn new(ledger: Arc<dyn LedgerRepository>, study: &StudyConfig) -> Self {
        Self {
            ledger,
            caps: study.caps(),
            attempts: study.allocation_attempts.max(1),
            backoff: Duration::from_millis(study.allocation_backoff_ms),
        }
    }

    pub fn caps(&self) -> AllocationCaps {
        self.caps
    }

    /// Current ledger counts.
    pub async fn snapshot(&self) -> DomainResult<LedgerSnapshot> {
        self.ledger.snapshot().await
    }

    /// Pick an eligible condition and claim one slot in it.
    #[instrument(skip(self), fields(per_condition = self.caps.per_condition, global = self.caps.global))]
    pub async fn allocate(&self) -> DomainResult<AllocationOutcome> {
        for attempt in 1..=self.attempts {
            let snapshot = self.ledger.snapshot().await?;

            let Some(condition) = self.pick(&snapshot) else {
                info!(total = snapshot.total(), "No eligible condition left; study is full");
                return Ok(AllocationOutcome::Exhausted);
            };

            if self.ledger.try_claim(condition, &self.caps).await? {
                info!(
                    condition = %condition,
                    attempt,
                    total = snapshot.total() + 1,
                    "Condition allocated"
                );
                return Ok(AllocationOutcome::Assigned(condition));
            }

            warn!(condition = %condition, attempt, "Slot taken by a concurrent session, retrying");
            if attempt < self.attempts {
                tokio::time::sleep(self.backoff * attempt).await;
            }
        }

        warn!(attempts = self.attempts, "Allocation gave up under contention");
        Err(DomainError::AllocationContended { attempts: self.attempts })
    }

    fn pick(&self, snapshot: &LedgerSnapshot) -> Option<Condition> {
        let mut rng = rand::thread_rng();
        snapshot.pick(&self.caps, &mut rng)
    }
}
