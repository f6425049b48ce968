//! Repository port for the allocation ledger.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AllocationCaps, Condition, LedgerSnapshot};

/// Shared store of participant counts per condition.
///
/// Counts only ever increase, and only through [`LedgerRepository::try_claim`].
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Read every ledger row.
    async fn snapshot(&self) -> DomainResult<LedgerSnapshot>;

    /// Atomically add one participant to `condition` if, at write time, the
    /// condition is below `caps.per_condition` and the ledger total is below
    /// `caps.global`. Returns `false` when either cap no longer holds.
    async fn try_claim(&self, condition: Condition, caps: &AllocationCaps) -> DomainResult<bool>;
}
