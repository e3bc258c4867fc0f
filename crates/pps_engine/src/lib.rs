use pps_core::{ConfigError, OutputId, StationConfig, StationSnapshot, StationState};
use serde::{Deserialize, Serialize};

/// A single mutation of the station, as pushed by a telemetry collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    ApplyInput { voltage_v: f64, current_a: f64 },
    #[serde(rename_all = "camelCase")]
    ConnectOutput { output_id: OutputId },
    #[serde(rename_all = "camelCase")]
    UpdateOutput {
        output_id: OutputId,
        voltage_v: f64,
        current_a: f64,
    },
    #[serde(rename_all = "camelCase")]
    DisconnectOutput { output_id: OutputId },
    #[serde(rename_all = "camelCase")]
    SetBatteryCharge { charge_wh: f64 },
}

impl Command {
    pub fn apply(&self, state: &mut StationState) {
        match self {
            Command::ApplyInput {
                voltage_v,
                current_a,
            } => state.apply_input_reading(*voltage_v, *current_a),
            Command::ConnectOutput { output_id } => state.connect_output(output_id.clone()),
            Command::UpdateOutput {
                output_id,
                voltage_v,
                current_a,
            } => {
                state.update_output(output_id, *voltage_v, *current_a);
            }
            Command::DisconnectOutput { output_id } => {
                state.disconnect_output(output_id);
            }
            Command::SetBatteryCharge { charge_wh } => state.set_battery_charge(*charge_wh),
        }
    }
}

/// Sole owner of a station: every mutation goes through `apply`.
pub struct Engine {
    station_state: StationState,
}

impl Engine {
    pub fn new(station_config: StationConfig) -> Result<Self, ConfigError> {
        Ok(Engine {
            station_state: StationState::new(station_config)?,
        })
    }

    pub fn state(&self) -> &StationState {
        &self.station_state
    }

    pub fn apply(&mut self, command: &Command) -> StationSnapshot {
        command.apply(&mut self.station_state);
        self.station_state.snapshot()
    }

    /// Apply commands in order; later writes to the same field win.
    pub fn apply_all<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> StationSnapshot {
        apply_all(&mut self.station_state, commands)
    }
}

pub fn apply_all<'a>(
    state: &mut StationState,
    commands: impl IntoIterator<Item = &'a Command>,
) -> StationSnapshot {
    let mut applied = 0;
    for command in commands {
        command.apply(state);
        applied += 1;
    }
    tracing::info!("Applied {} commands", applied);
    state.snapshot()
}
