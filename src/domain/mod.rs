//! Domain layer for the mirrorchat study server
//!
//! This module contains the study's core rules and domain models.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
