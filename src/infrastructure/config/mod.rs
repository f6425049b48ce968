//! Layered study configuration: built-in defaults, then `.mirrorchat/*.yaml`,
//! then `MIRRORCHAT_*` environment variables.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
