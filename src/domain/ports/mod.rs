//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - LedgerRepository: shared per-condition allocation counts
//! - TranscriptSink: per-condition turn log
//! - TextGenerator: chat-completion calls used for mirroring
//!
//! These traits keep the dialogue and allocation logic independent of the
//! store and the language-model vendor.

pub mod ledger_repository;
pub mod text_generator;
pub mod transcript_sink;

pub use ledger_repository::LedgerRepository;
pub use text_generator::{GenerationRequest, TextGenerator};
pub use transcript_sink::TranscriptSink;
