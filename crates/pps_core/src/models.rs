use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed parameters of a power station, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationConfig {
    pub station_id: String,
    /// Battery capacity in Wh
    pub battery_capacity_wh: f64,
    /// Ceiling applied to the input feed, in W
    pub maximum_input_w: f64,
    /// Ceiling applied to the aggregated outputs, in W
    pub maximum_output_w: f64,
}

/// Caller-supplied identifier of an output port.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OutputId(pub String);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutputId {
    fn from(id: &str) -> Self {
        OutputId(id.to_string())
    }
}

impl From<String> for OutputId {
    fn from(id: String) -> Self {
        OutputId(id)
    }
}

/// Last sample received for an output port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputReading {
    pub voltage_v: f64,
    pub current_a: f64,
}

impl OutputReading {
    pub fn power_w(&self) -> f64 {
        self.voltage_v * self.current_a
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Overload,
    Charging,
    Discharging,
    Idle,
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StationStatus::Overload => "overload",
            StationStatus::Charging => "charging",
            StationStatus::Discharging => "discharging",
            StationStatus::Idle => "idle",
        };
        f.write_str(label)
    }
}

/// Estimated time until the battery is full (net charging) or empty (net
/// discharging).
///
/// Both variants render as `HH:MM`. `Indefinite` renders as `99:59`, which is
/// also what a finite estimate of 5999 minutes looks like; the two are only
/// distinguishable through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Indefinite,
    Finite { minutes: u64 },
}

impl TimeRemaining {
    pub const INDEFINITE_DISPLAY: &'static str = "99:59";

    pub fn minutes(&self) -> Option<u64> {
        match self {
            TimeRemaining::Indefinite => None,
            TimeRemaining::Finite { minutes } => Some(*minutes),
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Indefinite => f.write_str(Self::INDEFINITE_DISPLAY),
            TimeRemaining::Finite { minutes } => {
                write!(f, "{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeRemainingError(String);

impl fmt::Display for ParseTimeRemainingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time remaining {:?}, expected HH:MM", self.0)
    }
}

impl std::error::Error for ParseTimeRemainingError {}

impl FromStr for TimeRemaining {
    type Err = ParseTimeRemainingError;

    /// `99:59` always parses back as `Indefinite`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::INDEFINITE_DISPLAY {
            return Ok(TimeRemaining::Indefinite);
        }
        let err = || ParseTimeRemainingError(s.to_string());
        let (hours, minutes) = s.split_once(':').ok_or_else(err)?;
        if hours.len() < 2 || minutes.len() != 2 {
            return Err(err());
        }
        let hours: u64 = hours.parse().map_err(|_| err())?;
        let minutes: u64 = minutes.parse().map_err(|_| err())?;
        if minutes >= 60 {
            return Err(err());
        }
        let minutes = hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .ok_or_else(err)?;
        Ok(TimeRemaining::Finite { minutes })
    }
}

impl Serialize for TimeRemaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeRemaining {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Read model of the station handed to dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    pub station_id: String,
    pub battery_capacity_wh: f64,
    pub current_charge_wh: f64,
    pub battery_percentage: f64,
    pub input_power_w: f64,
    pub total_output_power_w: f64,
    pub net_power_w: f64,
    pub time_remaining: TimeRemaining,
    pub status: StationStatus,
    pub outputs: BTreeMap<OutputId, OutputReading>,
}
