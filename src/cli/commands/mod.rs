//! CLI command implementations.

pub mod init;
pub mod ledger;
pub mod serve;
pub mod transcripts;
