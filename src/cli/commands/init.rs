//! Implementation of the `mirrorchat init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::initialize_from_config;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, DatabaseConfig};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::setup::DEFAULT_CONFIG_TEMPLATE;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("\nConfiguration written to {}", ConfigLoader::PROJECT_CONFIG));
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };

    let config_path = target_path.join(ConfigLoader::PROJECT_CONFIG);
    if let Some(dir) = config_path.parent() {
        fs::create_dir_all(dir).await.with_context(|| format!("Failed to create {:?}", dir))?;
    }

    let config_written = if config_path.exists() && !args.force {
        false
    } else {
        fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
            .await
            .with_context(|| format!("Failed to write {:?}", config_path))?;
        true
    };

    // The ledger is seeded by the initial migration; re-running is a no-op.
    let database = resolve_database(&config.database, &target_path);
    initialize_from_config(&database).await.context("Failed to initialize database")?;

    let output_data = InitOutput {
        success: true,
        message: if config_written {
            "Project initialized successfully.".to_string()
        } else {
            "Project already initialized; kept existing configuration. Use --force to overwrite.".to_string()
        },
        initialized_path: target_path,
        config_written,
        database_path: PathBuf::from(&database.path),
    };

    output(&output_data, json_mode);
    Ok(())
}

/// Relative database paths are placed under the target directory.
fn resolve_database(database: &DatabaseConfig, target: &Path) -> DatabaseConfig {
    let path = Path::new(&database.path);
    if path.is_absolute() {
        return database.clone();
    }
    DatabaseConfig {
        path: target.join(path).to_string_lossy().into_owned(),
        ..database.clone()
    }
}
