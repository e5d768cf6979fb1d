//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let ctx = commands::Context {
        output_format: cli.output.unwrap_or_default(),
        identities: cli.identities,
        config,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Fingerprint(args) => commands::fingerprint::execute(&ctx, &args),
        Commands::Identities => commands::identities::execute(&ctx).await,
        Commands::Analyze(args) => commands::analyze::execute(&ctx, args).await,
        Commands::Encrypt(args) => commands::encrypt::execute(&ctx, args).await,
        Commands::Open(args) => commands::open::execute(&ctx, &args),
        Commands::Send(args) => commands::send::execute(&ctx, args).await,
    }
}

/// Logs go to stderr so stdout stays clean for envelopes and JSON.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
