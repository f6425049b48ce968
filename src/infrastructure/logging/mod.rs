//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Rolling JSON log files via tracing-appender
//! - Secret scrubbing for upstream error bodies

pub mod logger;
pub mod secret_scrubbing;

pub use logger::{LogFormat, LoggerImpl, RotationPolicy};
pub use secret_scrubbing::SecretScrubber;
