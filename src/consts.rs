use embassy_time::Duration;

/// Rate of the control tick and of the readiness poll [Hz]
pub const CONTROL_RATE_HZ: u64 = 20;

/// Period of the control tick, 50 ms
pub const CONTROL_PERIOD: Duration = Duration::from_hz(CONTROL_RATE_HZ);

/// The flight controller leaves offboard mode below this setpoint rate [Hz]
pub const MIN_SETPOINT_RATE_HZ: u64 = 2;

/// Longest gap between two setpoints the flight controller tolerates
pub const MAX_SETPOINT_GAP: Duration = Duration::from_hz(MIN_SETPOINT_RATE_HZ);

/// Position held while the mode trigger is inactive [m]
pub const HOLD_POSITION: [f64; 3] = [0.0, 0.0, 2.0];

/// Forward velocity commanded while the mode trigger is active [m/s]
pub const FORWARD_VELOCITY: f64 = 0.3;

/// Custom mode identifier requested from the flight controller
pub const OFFBOARD_MODE: &str = "OFFBOARD";
