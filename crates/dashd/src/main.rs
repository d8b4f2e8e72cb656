//! dashd entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Vehicle dashboard telemetry daemon
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DASHD_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    dashd::init_logging();

    info!("Starting dashd v{}", env!("CARGO_PKG_VERSION"));

    let config = dashd::AppConfig::load(args.config.as_deref())?;
    info!(
        channel = %config.bus.channel,
        port = config.server.port,
        "Configuration loaded"
    );

    let app = dashd::Application::new(config);
    app.run().await?;

    Ok(())
}
