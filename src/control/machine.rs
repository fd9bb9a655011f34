use crate::{
    consts::{FORWARD_VELOCITY, HOLD_POSITION},
    state::{ModeTriggerLatch, TelemetryMirror},
    types::setpoint::{PositionSetpoint, Setpoint, VelocitySetpoint},
};

/// The two control regimes the vehicle is toggled between.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Publish the fixed position setpoint, while tracking the current
    /// height as the future altitude reference.
    #[default]
    PositionHold,
    /// Fly forward at a fixed velocity, correcting the vertical velocity
    /// toward the altitude captured when position hold was left.
    VelocityHold,
}

impl ControlMode {
    /// Mode selected by the trigger flag. There is no hysteresis, the flag
    /// alone decides.
    pub fn from_trigger(active: bool) -> Self {
        match active {
            false => ControlMode::PositionHold,
            true => ControlMode::VelocityHold,
        }
    }
}

/// Altitude to hold while in velocity hold.
///
/// Resampled every position-hold tick, frozen otherwise, never cleared.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct HoldAltitudeReference {
    pub value: f64,
}

/// Proportional (unit gain) vertical velocity pushing the vehicle back
/// toward `reference`. The sign is kept literal: the velocity frame of the
/// flight controller decides what a positive command means.
pub fn altitude_hold_velocity(height: f64, reference: f64) -> f64 {
    -(height - reference)
}

pub struct ControlModeMachine {
    name: &'static str,
    mode: ControlMode,
    reference: HoldAltitudeReference,
    hold_position: PositionSetpoint,
    forward_velocity: f64,
}

impl Default for ControlModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlModeMachine {
    pub fn new() -> Self {
        Self {
            name: "control_mode",
            mode: ControlMode::PositionHold,
            reference: HoldAltitudeReference::default(),
            hold_position: PositionSetpoint::from_array(HOLD_POSITION),
            forward_velocity: FORWARD_VELOCITY,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn reference(&self) -> HoldAltitudeReference {
        self.reference
    }

    /// Evaluate one control tick, returning the single setpoint to publish.
    pub fn step(&mut self, mirror: &TelemetryMirror, trigger: &ModeTriggerLatch) -> Setpoint {
        let mode = ControlMode::from_trigger(trigger.is_active());
        let height = mirror.current_height();

        if mode != self.mode {
            info!(
                "[{}] {:?} -> {:?} at height {:.3}, reference {:.3}",
                self.name, self.mode, mode, height, self.reference.value
            );
            self.mode = mode;
        }

        match self.mode {
            ControlMode::PositionHold => {
                self.reference.value = height;
                Setpoint::Position(self.hold_position)
            }
            ControlMode::VelocityHold => {
                let vertical = altitude_hold_velocity(height, self.reference.value);
                Setpoint::Velocity(VelocitySetpoint::linear(self.forward_velocity, 0.0, vertical))
            }
        }
    }
}
