//! Control-mode state machine and the altitude-hold law.

mod machine;

pub use machine::{altitude_hold_velocity, ControlMode, ControlModeMachine, HoldAltitudeReference};
