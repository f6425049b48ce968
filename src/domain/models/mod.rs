//! Domain models for the study server.

pub mod condition;
pub mod config;
pub mod ledger;
pub mod participant;
pub mod script;
pub mod session;
pub mod transcript;

pub use condition::{Condition, Mirroring, Tone};
pub use config::{Config, DatabaseConfig, LlmConfig, LoggingConfig, ServerConfig, StudyConfig};
pub use ledger::{AllocationCaps, AllocationOutcome, LedgerRow, LedgerSnapshot};
pub use participant::ParticipantId;
pub use session::{
    ChatMessage, ChatRole, ChatSession, SessionLimits, SessionPhase, SessionView, TurnProgress,
};
pub use transcript::TranscriptRow;
