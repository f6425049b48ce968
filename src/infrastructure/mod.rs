//! Infrastructure layer module
//!
//! Cross-cutting concerns shared by the adapters and the CLI:
//! - Configuration management
//! - Logging infrastructure
//! - Setup: default config template and service wiring

pub mod config;
pub mod logging;
pub mod setup;
