// Sweepd zone-cleaning coordinator
// Main entry point for the sweepd binary

use clap::Parser;
use sweepd_engine::cli::{Cli, Command};
use sweepd_engine::config::Config;
use sweepd_engine::handlers::{
    handle_check, handle_clean, handle_start, handle_zones, OutputFormat,
};
use sweepd_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = match &cli.config {
        Some(config_path) => Config::load_from_path(config_path)?,
        None => Config::load_default()?,
    };

    // Log level priority: RUST_LOG > --log flag > config
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");
    tracing::info!("sweepd v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Start => handle_start(&config).await,

        Command::Check => handle_check(&config, format),

        Command::Zones => handle_zones(&config, format),

        Command::Clean { zones, mode } => handle_clean(&zones, mode, &config, format).await,
    }
}
