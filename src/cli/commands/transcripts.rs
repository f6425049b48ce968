//! Implementation of the `mirrorchat transcripts` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::sqlite::{initialize_from_config, SqliteTranscriptRepository};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Condition, Config, TranscriptRow};
use crate::domain::ports::TranscriptSink;

#[derive(Args, Debug)]
pub struct TranscriptsArgs {
    /// Condition letter (A-D) or sheet key such as `formal-predicate`
    #[arg(short = 'C', long)]
    pub condition: Condition,

    /// Maximum number of most recent rows to show
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct TranscriptRowOutput {
    participant_id: String,
    tone: String,
    mirroring: String,
    turn: u32,
    user_utterance: String,
    bot_reply: String,
    logged_at: String,
}

impl From<&TranscriptRow> for TranscriptRowOutput {
    fn from(row: &TranscriptRow) -> Self {
        Self {
            participant_id: row.participant_id.to_string(),
            tone: row.condition.tone.label().to_string(),
            mirroring: row.condition.mirroring.label().to_string(),
            turn: row.turn,
            user_utterance: row.user_utterance.clone(),
            bot_reply: row.bot_reply.clone(),
            logged_at: row.timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranscriptsOutput {
    sheet: &'static str,
    #[serde(skip)]
    rows: Vec<TranscriptRow>,
    #[serde(rename = "rows")]
    json_rows: Vec<TranscriptRowOutput>,
}

impl TranscriptsOutput {
    pub fn new(condition: Condition, rows: Vec<TranscriptRow>) -> Self {
        let json_rows = rows.iter().map(TranscriptRowOutput::from).collect();
        Self {
            sheet: condition.sheet_key(),
            rows,
            json_rows,
        }
    }
}

impl CommandOutput for TranscriptsOutput {
    fn to_human(&self) -> String {
        if self.rows.is_empty() {
            return format!("No rows logged in sheet {}.", self.sheet);
        }
        format!(
            "Sheet {} ({} row(s))\n{}",
            self.sheet,
            self.rows.len(),
            TableFormatter::new().format_transcripts(&self.rows)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: TranscriptsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to initialize database")?;
    let repo = SqliteTranscriptRepository::new(pool);

    let rows = repo
        .list(args.condition, args.limit)
        .await
        .with_context(|| format!("Failed to read sheet {}", args.condition.sheet_key()))?;

    output(&TranscriptsOutput::new(args.condition, rows), json_mode);
    Ok(())
}
