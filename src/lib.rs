//! Mirrorchat - movie-talk study chatbot
//!
//! Mirrorchat runs a short Korean conversation about movies and dramas with
//! each participant, under one of four experimental conditions (speech level
//! crossed with predicate mirroring). Conditions are allocated from a shared
//! ledger so every cell fills to the same cap, and each counted turn is logged
//! to the condition's transcript sheet.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): conditions, ledger, session state machine, script
//! - **Service Layer** (`services`): allocation, mirroring and the dialogue driver
//! - **Adapters** (`adapters`): SQLite store, OpenAI-compatible client, axum server
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, wiring
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use mirrorchat::adapters::sqlite::initialize_from_config;
//! use mirrorchat::infrastructure::setup::build_dialogue_service;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = mirrorchat::ConfigLoader::load()?;
//!     let pool = initialize_from_config(&config.database).await?;
//!     let dialogue = build_dialogue_service(&config, pool)?;
//!     let view = dialogue.start_session().await?;
//!     println!("participant {}", view.participant_id);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AllocationCaps, AllocationOutcome, Condition, Config, LedgerSnapshot, Mirroring, ParticipantId,
    SessionPhase, SessionView, Tone, TranscriptRow,
};
pub use domain::ports::{LedgerRepository, TextGenerator, TranscriptSink};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AllocationService, DialogueService, MirroringService, TurnOutcome};
