use axum::{
    Json,
    extract::{Path, State},
};
use pps_core::{OutputId, StationSnapshot};

use crate::station::ReadingRequest;
use crate::{SharedState, lock_state};

/// Connect an output port, resetting its reading to zero
pub async fn connect_output(
    State(app_state): State<SharedState>,
    Path(output_id): Path<OutputId>,
) -> Json<StationSnapshot> {
    let mut state = lock_state(&app_state);
    state.connect_output(output_id);
    Json(state.snapshot())
}

/// Push a sample for a connected output port.
///
/// Samples for ports that were never connected are dropped without error.
pub async fn update_output(
    State(app_state): State<SharedState>,
    Path(output_id): Path<OutputId>,
    Json(payload): Json<ReadingRequest>,
) -> Json<StationSnapshot> {
    let mut state = lock_state(&app_state);
    state.update_output(&output_id, payload.voltage_v, payload.current_a);
    Json(state.snapshot())
}

/// Disconnect an output port
pub async fn disconnect_output(
    State(app_state): State<SharedState>,
    Path(output_id): Path<OutputId>,
) -> Json<StationSnapshot> {
    let mut state = lock_state(&app_state);
    state.disconnect_output(&output_id);
    Json(state.snapshot())
}
