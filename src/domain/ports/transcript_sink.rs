//! Port for the per-condition transcript log.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Condition, TranscriptRow};

#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Append one row to the sheet of the row's condition.
    async fn append(&self, row: &TranscriptRow) -> DomainResult<()>;

    /// Most recent rows of one condition's sheet, oldest first.
    async fn list(&self, condition: Condition, limit: usize) -> DomainResult<Vec<TranscriptRow>>;
}
