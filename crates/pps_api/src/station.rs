use axum::{Json, extract::State};
use pps_core::{StationConfig, StationSnapshot};
use pps_engine::Command;
use serde::{Deserialize, Serialize};

use crate::{SharedState, lock_state};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRequest {
    pub voltage_v: f64,
    pub current_a: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryChargeRequest {
    pub charge_wh: f64,
}

/// Get current station configuration
pub async fn get_station_config(State(app_state): State<SharedState>) -> Json<StationConfig> {
    tracing::info!("Getting station configuration");
    let state = lock_state(&app_state);
    Json(state.get_config().clone())
}

/// Get the derived station state
pub async fn get_station_status(State(app_state): State<SharedState>) -> Json<StationSnapshot> {
    tracing::info!("Getting station status");
    let state = lock_state(&app_state);
    Json(state.snapshot())
}

/// Push a sample of the input feed
pub async fn apply_input(
    State(app_state): State<SharedState>,
    Json(payload): Json<ReadingRequest>,
) -> Json<StationSnapshot> {
    let mut state = lock_state(&app_state);
    state.apply_input_reading(payload.voltage_v, payload.current_a);
    Json(state.snapshot())
}

/// Overwrite the stored battery energy
pub async fn set_battery_charge(
    State(app_state): State<SharedState>,
    Json(payload): Json<BatteryChargeRequest>,
) -> Json<StationSnapshot> {
    let mut state = lock_state(&app_state);
    state.set_battery_charge(payload.charge_wh);
    Json(state.snapshot())
}

/// Apply a batch of commands in order
pub async fn apply_commands(
    State(app_state): State<SharedState>,
    Json(commands): Json<Vec<Command>>,
) -> Json<StationSnapshot> {
    let mut state = lock_state(&app_state);
    Json(pps_engine::apply_all(&mut *state, &commands))
}
