//! Implementation of the `mirrorchat serve` command.

use anyhow::{anyhow, Context, Result};
use clap::Args;

use crate::adapters::http::ChatHttpServer;
use crate::adapters::sqlite::initialize_from_config;
use crate::domain::models::Config;
use crate::infrastructure::setup::build_dialogue_service;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: &Config, _json_mode: bool) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let pool = initialize_from_config(&config.database)
        .await
        .context("Failed to initialize database")?;
    let dialogue = build_dialogue_service(config, pool)?;

    tracing::info!(
        per_condition_cap = config.study.per_condition_cap,
        global_cap = config.study.global_cap,
        max_turns = config.study.max_turns,
        "Starting study server"
    );

    ChatHttpServer::new(dialogue, server_config, config.study.max_input_chars)
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| anyhow!("Chat server failed: {}", e))
}
