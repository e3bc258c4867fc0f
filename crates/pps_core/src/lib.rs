mod derived;
mod models;

pub use crate::models::*;
use std::collections::HashMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Station parameter {field} must be a finite number greater than zero, got {value}")]
    InvalidParameter { field: &'static str, value: f64 },
}

/// In-memory electrical state of a single portable power station.
///
/// Every mutation is total: out of range values are clamped and unknown
/// outputs are ignored. Derived quantities are recomputed on each read.
///
/// The only way in is [`StationState::new`]; there is no deserialized form
/// that could bypass the config checks or the charge bounds.
///
/// ```compile_fail
/// fn from_json<T: serde::de::DeserializeOwned>() {}
/// from_json::<pps_core::StationState>();
/// ```
#[derive(Debug, Clone)]
pub struct StationState {
    config: StationConfig,
    current_charge_wh: f64,
    input_power_w: f64,
    outputs: HashMap<OutputId, OutputReading>,
}

fn check_parameter(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { field, value })
    }
}

impl StationState {
    /// Build a station with a full battery, no input and no outputs.
    pub fn new(config: StationConfig) -> Result<Self, ConfigError> {
        check_parameter("batteryCapacityWh", config.battery_capacity_wh)?;
        check_parameter("maximumInputW", config.maximum_input_w)?;
        check_parameter("maximumOutputW", config.maximum_output_w)?;

        tracing::info!(
            "Creating station {} with {} Wh capacity",
            config.station_id,
            config.battery_capacity_wh
        );
        Ok(StationState {
            current_charge_wh: config.battery_capacity_wh,
            input_power_w: 0.0,
            outputs: HashMap::new(),
            config,
        })
    }

    pub fn get_config(&self) -> &StationConfig {
        &self.config
    }

    pub fn get_outputs(&self) -> &HashMap<OutputId, OutputReading> {
        &self.outputs
    }

    pub fn current_charge_wh(&self) -> f64 {
        self.current_charge_wh
    }

    pub fn input_power_w(&self) -> f64 {
        self.input_power_w
    }

    /// Store the input feed sample. The resulting power is capped at the
    /// maximum input but has no lower bound.
    pub fn apply_input_reading(&mut self, voltage_v: f64, current_a: f64) {
        let raw_power = voltage_v * current_a;
        self.input_power_w = derived::cap(raw_power, self.config.maximum_input_w);
        tracing::info!(
            "Input reading {} V x {} A, input power {} W",
            voltage_v,
            current_a,
            self.input_power_w
        );
    }

    /// Connect an output with a zero reading, resetting it if already connected.
    pub fn connect_output(&mut self, output_id: OutputId) {
        tracing::info!("Connecting output {}", output_id);
        self.outputs.insert(output_id, OutputReading::default());
    }

    /// Replace the reading of a connected output.
    ///
    /// Returns `false`, and changes nothing, when the output is not connected.
    pub fn update_output(&mut self, output_id: &OutputId, voltage_v: f64, current_a: f64) -> bool {
        let Some(reading) = self.outputs.get_mut(output_id) else {
            tracing::debug!("Ignoring reading for unknown output {}", output_id);
            return false;
        };
        *reading = OutputReading {
            voltage_v,
            current_a,
        };
        true
    }

    /// Returns whether the output was connected.
    pub fn disconnect_output(&mut self, output_id: &OutputId) -> bool {
        tracing::info!("Disconnecting output {}", output_id);
        self.outputs.remove(output_id).is_some()
    }

    /// Set the stored energy, clamped to `[0, capacity]`.
    ///
    /// A NaN charge is ignored so the clamping invariant always holds.
    pub fn set_battery_charge(&mut self, charge_wh: f64) {
        if charge_wh.is_nan() {
            tracing::warn!("Ignoring NaN battery charge");
            return;
        }
        self.current_charge_wh = charge_wh.clamp(0.0, self.config.battery_capacity_wh);
        tracing::info!("Battery charge set to {} Wh", self.current_charge_wh);
    }

    /// Charge level in percent, rounded to one decimal place.
    pub fn battery_percentage(&self) -> f64 {
        let ratio = self.current_charge_wh / self.config.battery_capacity_wh;
        derived::round_to_tenths(ratio * 100.0)
    }

    /// Sum of all output powers, rounded to the watt then capped at the
    /// maximum output.
    pub fn total_output_power(&self) -> f64 {
        derived::total_output_power(&self.outputs, self.config.maximum_output_w)
    }

    /// Input power minus total output power. Positive means net charging.
    pub fn net_power(&self) -> f64 {
        self.input_power_w - self.total_output_power()
    }

    pub fn time_remaining(&self) -> TimeRemaining {
        derived::time_remaining(
            self.config.battery_capacity_wh,
            self.current_charge_wh,
            self.net_power(),
        )
    }

    pub fn status(&self) -> StationStatus {
        derived::classify(
            self.input_power_w,
            self.total_output_power(),
            self.config.maximum_input_w,
            self.config.maximum_output_w,
        )
    }

    pub fn snapshot(&self) -> StationSnapshot {
        let total_output_power_w = self.total_output_power();
        let net_power_w = self.input_power_w - total_output_power_w;
        StationSnapshot {
            station_id: self.config.station_id.clone(),
            battery_capacity_wh: self.config.battery_capacity_wh,
            current_charge_wh: self.current_charge_wh,
            battery_percentage: self.battery_percentage(),
            input_power_w: self.input_power_w,
            total_output_power_w,
            net_power_w,
            time_remaining: derived::time_remaining(
                self.config.battery_capacity_wh,
                self.current_charge_wh,
                net_power_w,
            ),
            status: derived::classify(
                self.input_power_w,
                total_output_power_w,
                self.config.maximum_input_w,
                self.config.maximum_output_w,
            ),
            outputs: self
                .outputs
                .iter()
                .map(|(id, reading)| (id.clone(), *reading))
                .collect(),
        }
    }
}
