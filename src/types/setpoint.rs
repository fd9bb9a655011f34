use core::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Absolute position target in the local frame [m].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSetpoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PositionSetpoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn from_array([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Velocity target in the local frame [m/s]. Angular velocity is not
/// commanded by this system and is always zero.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocitySetpoint {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl VelocitySetpoint {
    pub fn linear(x: f64, y: f64, z: f64) -> Self {
        Self {
            linear: Vector3::new(x, y, z),
            angular: Vector3::zeros(),
        }
    }
}

/// The single message published on every control tick.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Setpoint {
    Position(PositionSetpoint),
    Velocity(VelocitySetpoint),
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setpoint::Position(sp) => {
                write!(f, "setpoint: {:.1}, {:.1}, {:.1}", sp.x, sp.y, sp.z)
            }
            Setpoint::Velocity(sp) => {
                let v = &sp.linear;
                write!(f, "cmd_vel: {:.3}, {:.3}, {:.3}", v.x, v.y, v.z)
            }
        }
    }
}
