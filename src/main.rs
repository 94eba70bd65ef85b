//! CEP weather services.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client                 gateway                 weather-service            external
//!   ──────                 ───────                 ───────────────            ────────
//!   POST / {"cep"} ──▶ validate CEP
//!                      GET /weather/{cep} ───────▶ validate CEP
//!                                                  resolve location ────────▶ ViaCEP
//!                                                  resolve weather  ────────▶ WeatherAPI
//!                                                  convert °C → °F, K
//!   ◀──────────────── relay status/body ◀──────── 200 JSON | 404 | 422 | 500
//!
//!   traceparent ───────▶ ───────────────────────▶ ──────────────────────────▶
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cep_weather::config::{load_gateway_config, load_weather_service_config, ObservabilityConfig};
use cep_weather::lifecycle::{self, signals};
use cep_weather::observability::{self, metrics};

#[derive(Parser)]
#[command(name = "cep-weather")]
#[command(about = "CEP to temperature services", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand)]
enum Service {
    /// Validate CEPs and forward them to the weather service
    Gateway,
    /// Resolve CEPs to city and temperature
    Weather,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.service {
        Service::Gateway => {
            let config = load_gateway_config(cli.config.as_deref())?;
            let telemetry = init_observability(&config.observability)?;

            tracing::info!(
                bind_address = %config.listener.bind_address,
                downstream = %config.downstream.base_url,
                downstream_timeout_secs = config.downstream.timeout_secs,
                "Configuration loaded"
            );

            let running = lifecycle::start_gateway(&config, telemetry.propagation()).await?;
            signals::wait_for_shutdown().await;
            running.stop().await?;
            telemetry.shutdown();
        }
        Service::Weather => {
            let config = load_weather_service_config(cli.config.as_deref())?;
            let telemetry = init_observability(&config.observability)?;

            tracing::info!(
                bind_address = %config.listener.bind_address,
                location_api = %config.location.base_url,
                weather_api = %config.weather.base_url,
                "Configuration loaded"
            );

            let running = lifecycle::start_weather_service(&config, telemetry.propagation()).await?;
            signals::wait_for_shutdown().await;
            running.stop().await?;
            telemetry.shutdown();
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_observability(
    config: &ObservabilityConfig,
) -> Result<observability::Telemetry, Box<dyn std::error::Error>> {
    let telemetry = observability::logging::init(config)?;

    if config.metrics_enabled {
        match config.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    Ok(telemetry)
}
