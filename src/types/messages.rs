//! Messages exchanged with the flight controller over the messaging bridge.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Connectivity report from the flight controller.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStatus {
    pub connected: bool,
}

/// Local pose estimate of the vehicle. Only the height is used by the
/// control loop, the remaining fields are carried for completeness.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn from_height(z: f64) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, z),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn height(&self) -> f64 {
        self.position.z
    }
}

/// External request to switch between position and velocity control.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTrigger {
    pub active: bool,
}

/// Everything the bridge may deliver to the control loop.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum InboundMessage {
    LinkStatus(LinkStatus),
    Pose(Pose),
    ModeTrigger(ModeTrigger),
}

macro_rules! impl_inbound_from {
    ($message:ident) => {
        impl From<$message> for InboundMessage {
            fn from(value: $message) -> Self {
                InboundMessage::$message(value)
            }
        }
    };
}

impl_inbound_from!(LinkStatus);
impl_inbound_from!(Pose);
impl_inbound_from!(ModeTrigger);

/// Request to change the custom flight mode of the flight controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetModeResponse {
    pub mode_accepted: bool,
}

/// Request to arm (`true`) or disarm (`false`) the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmRequest {
    pub arm: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmResponse {
    pub success: bool,
}
