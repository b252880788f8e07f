//! AutoCut CLI
//!
//! Cuts the silent stretches out of videos with ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! autocut cut --input talk.mp4 --crossfade 0.25 --fade-out
//! autocut batch --folder recordings/
//! autocut plan --input talk.mp4 --json
//! autocut tools
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info, warn};

use autocut_cli::adapters::TracingLogAdapter;
use autocut_cli::app::{AppContainer, DefaultAppContainer};
use autocut_cli::cli::{commands, Cli, Commands};
use autocut_cli::config_initialization::initialize_configuration_hierarchy;
use autocut_cli::domain::context::RunContext;

/// Main entry point for the AutoCut CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match initialize_configuration_hierarchy(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    TracingLogAdapter::init(&config.settings.logging);
    match &config.source {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => debug!("No config file found, using defaults"),
    }

    let container = DefaultAppContainer::new(config.settings);
    let ctx = RunContext::new();

    // Ctrl+C is the only way a run gets cancelled.
    let handle = ctx.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            handle.cancel();
        }
    });

    match run(&cli, &container, &ctx).await {
        Ok(code) => code,
        Err(e) if commands::is_cancellation(&e) => {
            warn!("Run cancelled");
            eprintln!("Cancelled");
            ExitCode::from(commands::EXIT_CANCELLED)
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, container: &dyn AppContainer, ctx: &RunContext) -> Result<ExitCode> {
    match &cli.command {
        Commands::Cut(args) => {
            info!("Executing cut command");
            commands::cut(container, args, ctx).await
        }
        Commands::Batch(args) => {
            info!("Executing batch command");
            commands::batch(container, args, ctx).await
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(container, args, ctx).await
        }
        Commands::Tools(args) => commands::tools(container, args).await,
    }
}
