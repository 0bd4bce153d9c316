//! EcoWork Hub - Entry Point
//!
//! Bridges office sensor devices on an MQTT broker to a live web dashboard:
//! telemetry, presence status and alerts in, derived lamp state and
//! WebSocket events out.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// EcoWork telemetry hub
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ECOWORK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    ecowork_observability::init_logging("info,ecowork=debug")?;

    info!("Starting EcoWork Hub v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > ECOWORK_CONFIG env var > default.
    // An explicitly named file must exist; the default path may not.
    let config = match args.config.or_else(|| std::env::var("ECOWORK_CONFIG").ok()) {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            ecowork_hub::HubConfig::from_file(&path)?
        }
        None => {
            info!(config_path = %ecowork_hub::DEFAULT_CONFIG_PATH, "Loading configuration");
            ecowork_hub::HubConfig::from_file_or_default(ecowork_hub::DEFAULT_CONFIG_PATH)?
        }
    };

    info!(
        bus_host = %config.bus.host,
        bus_port = config.bus.port,
        dashboard_port = config.dashboard.port,
        "Configuration loaded"
    );

    // Create and run the application
    let app = ecowork_hub::Application::new(config)?;
    app.run().await?;

    Ok(())
}
