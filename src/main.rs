use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use zipcode_weather::{ServiceConfig, WeatherService, telemetry, web};

#[derive(Debug, Parser)]
#[command(name = "zipcode-weather", version, about = "Current temperature by Brazilian zipcode")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overrides config and PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = ServiceConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging)?;

    match dotenv {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(_) => tracing::debug!("No .env file found"),
    }
    tracing::info!("Starting zipcode-weather {}", zipcode_weather::VERSION);

    let service = WeatherService::from_config(&config)?;
    web::run(&config.server, service).await
}
