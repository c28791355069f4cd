//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use pfxchain::{CancellationToken, DEFAULT_MAX_FETCHES, DEFAULT_TIMEOUT};
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Flags win over the config file
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);
    let timeout = cli
        .timeout
        .or(config.timeout_secs)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let max_fetches = cli
        .max_fetches
        .or(config.max_fetches)
        .unwrap_or(DEFAULT_MAX_FETCHES);

    // Ctrl-C stops resolution; whatever was assembled is still printed
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let ctx = commands::Context {
        config,
        output_format,
        timeout,
        max_fetches,
        cancel,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(ctx, args).await,
        Commands::Bundle(args) => commands::bundle::execute(ctx, args).await,
        Commands::Inspect(args) => commands::inspect::execute(&ctx, &args),
    }
}

/// Log to stderr so stdout stays clean for PEM and JSON output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
