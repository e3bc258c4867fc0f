use clap::Parser;
use pps_api::create_app;
use pps_core::{StationConfig, StationState};
use std::path::PathBuf;

/// Command line arguments for the power station server
#[derive(Parser, Debug)]
#[command(name = "power-station")]
#[command(about = "Serves the live state of a portable power station")]
struct Args {
    /// JSON file with the battery capacity and power ceilings
    #[arg(short, long)]
    config: PathBuf,

    /// Port on which readings are accepted and state is served
    #[arg(short, long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt().pretty().init();

    let raw_config = tokio::fs::read_to_string(&args.config)
        .await
        .map_err(|e| format!("Cannot read station file {}: {}", args.config.display(), e))?;

    let station_config: StationConfig = serde_json::from_str(&raw_config)
        .map_err(|e| format!("Malformed station file {}: {}", args.config.display(), e))?;

    // Ceilings are fixed for the lifetime of the process
    let station = StationState::new(station_config)
        .map_err(|e| format!("Rejected station file {}: {}", args.config.display(), e))?;

    let config = station.get_config();
    tracing::info!(
        station_id = %config.station_id,
        battery_capacity_wh = config.battery_capacity_wh,
        maximum_input_w = config.maximum_input_w,
        maximum_output_w = config.maximum_output_w,
        "Station ready at {}% charge",
        station.battery_percentage()
    );

    let app = create_app(station);

    let bind_addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Cannot listen for telemetry on {}: {}", bind_addr, e))?;
    tracing::info!("Accepting readings on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Telemetry server stopped: {}", e))?;

    Ok(())
}
