//! Domain errors for the mirrorchat study server.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while running the study.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Every condition has reached its cap, or the global cap is reached.
    #[error("모든 조건이 마감되었습니다.")]
    StudyFull,

    /// The ledger kept changing under us until the attempt budget ran out.
    #[error("Allocation contended: no slot claimed after {attempts} attempts")]
    AllocationContended { attempts: u32 },

    #[error("Input rejected: {0}")]
    InputRejected(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session {0} is already completed")]
    SessionCompleted(Uuid),

    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
