use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub fn load_from_file_path(path: &str) -> Result<SimConfig, ConfigError> {
    let mut file = std::fs::File::open(path)?;
    let mut string = String::with_capacity(1024);
    file.read_to_string(&mut string)?;
    SimConfig::from_toml_str(&string)
}

/// A change of the external mode trigger at a given simulation time.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub at_s: f64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Rate of the physics step and of the telemetry stream [Hz]
    pub step_hz: u32,
    /// Simulation time before the link reports connected [s]
    pub connect_after_s: f64,
    /// Height of the vehicle at start [m]
    pub initial_height: f64,
    /// Proportional gain used to track position setpoints [1/s]
    pub position_gain: f64,
    /// Speed limit of the vehicle [m/s]
    pub max_speed: f64,
    /// Consecutive setpoints required before offboard mode engages
    pub offboard_warmup_setpoints: u32,
    /// Offboard mode is left when no setpoint arrives within this time [s]
    pub setpoint_timeout_s: f64,
    /// Scripted mode trigger changes, sorted by time
    pub triggers: Vec<TriggerEvent>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_hz: 50,
            connect_after_s: 1.0,
            initial_height: 0.0,
            position_gain: 1.0,
            max_speed: 2.0,
            offboard_warmup_setpoints: 10,
            setpoint_timeout_s: 0.5,
            triggers: vec![
                TriggerEvent {
                    at_s: 10.0,
                    active: true,
                },
                TriggerEvent {
                    at_s: 20.0,
                    active: false,
                },
            ],
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(string: &str) -> Result<Self, ConfigError> {
        let mut config: SimConfig =
            toml::from_str(string).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        config.triggers.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "step_hz",
                reason: "must be positive",
            });
        }

        if !(self.setpoint_timeout_s > 0.0) {
            return Err(ConfigError::Invalid {
                field: "setpoint_timeout_s",
                reason: "must be positive",
            });
        }

        if !(self.max_speed > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_speed",
                reason: "must be positive",
            });
        }

        Ok(())
    }

    pub fn step_dt(&self) -> f64 {
        1.0 / self.step_hz as f64
    }
}
