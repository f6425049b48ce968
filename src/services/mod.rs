//! Application services: allocation, mirroring and the dialogue driver.

pub mod allocation_service;
pub mod dialogue_service;
pub mod mirroring_service;

pub use allocation_service::AllocationService;
pub use dialogue_service::{DialogueService, TurnOutcome};
pub use mirroring_service::{MirroringParams, MirroringService};
