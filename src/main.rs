//! Entry point for the sticker pack bot.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stickerbot_core::bot::{PackHandler, run_polling};
use stickerbot_core::config::Credentials;
use stickerbot_core::telegram::BotApiClient;
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    debug!(api_id = credentials.api_id, "credentials loaded");

    let settings = args.settings();
    settings.validate()?;

    tokio::fs::create_dir_all(&settings.work_root)
        .await
        .with_context(|| format!("failed to create work directory {}", settings.work_root.display()))?;

    let client = Arc::new(BotApiClient::new(
        &credentials.bot_token,
        &settings.api_url,
        settings.timeouts,
    )?);

    let me = match client.get_me().await {
        Ok(me) => me,
        Err(e) => {
            error!(error = %e, "Failed to start bot");
            info!("Bot has been stopped");
            return Err(e.into());
        }
    };
    info!(
        "Bot started as @{}",
        me.username.as_deref().unwrap_or("unknown")
    );

    let handler = Arc::new(PackHandler::new(
        client.clone(),
        settings.work_root.clone(),
        settings.retry_policy(),
    ));

    run_polling(client, handler, settings.poll_settings(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await;

    info!("Bot has been stopped");
    Ok(())
}
