//! Implementation of the `mirrorchat ledger` command.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::http::LedgerResponse;
use crate::adapters::sqlite::{initialize_from_config, SqliteLedgerRepository};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{AllocationCaps, Config, LedgerSnapshot};
use crate::services::AllocationService;

#[derive(Debug, Serialize)]
pub struct LedgerOutput {
    #[serde(skip)]
    snapshot: LedgerSnapshot,
    #[serde(skip)]
    caps: AllocationCaps,
    #[serde(flatten)]
    response: LedgerResponse,
}

impl LedgerOutput {
    pub fn new(snapshot: LedgerSnapshot, caps: AllocationCaps) -> Self {
        let response = LedgerResponse::new(&snapshot, &caps);
        Self { snapshot, caps, response }
    }
}

impl CommandOutput for LedgerOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![TableFormatter::new().format_ledger(&self.snapshot, &self.caps)];
        if self.response.exhausted {
            lines.push("All conditions are closed; new sessions will be refused.".to_string());
        } else {
            lines.push(format!("{} slot(s) remaining.", self.response.remaining));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to initialize database")?;
    let service = AllocationService::new(Arc::new(SqliteLedgerRepository::new(pool)), &config.study);

    let snapshot = service.snapshot().await.context("Failed to read ledger")?;
    output(&LedgerOutput::new(snapshot, service.caps()), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output_carries_counts_and_caps() {
        let out = LedgerOutput::new(LedgerSnapshot::from_counts([18, 18, 18, 18]), AllocationCaps::default());
        let json = out.to_json();
        assert_eq!(json["total"], 72);
        assert_eq!(json["exhausted"], true);
        assert_eq!(json["rows"][3]["condition"], "D");
    }

    #[test]
    fn test_human_output_reports_remaining() {
        let out = LedgerOutput::new(LedgerSnapshot::from_counts([1, 0, 0, 0]), AllocationCaps::default());
        assert!(out.to_human().contains("71 slot(s) remaining."));
    }
}
