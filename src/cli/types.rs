//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::init::InitArgs;
use super::commands::serve::ServeArgs;
use super::commands::transcripts::TranscriptsArgs;

#[derive(Parser)]
#[command(name = "mirrorchat")]
#[command(about = "Mirrorchat - movie-talk study chatbot with balanced condition allocation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to load instead of .mirrorchat/config.yaml
    #[arg(short, long, global = true, env = "MIRRORCHAT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .mirrorchat/, write the default configuration and migrate the database
    Init(InitArgs),

    /// Run the participant chat server
    Serve(ServeArgs),

    /// Show allocation counts per condition
    Ledger,

    /// Show logged turns for one condition
    Transcripts(TranscriptsArgs),
}
