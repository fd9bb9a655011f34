use nalgebra::Vector3;

use super::config::SimConfig;
use crate::{consts::OFFBOARD_MODE, types::setpoint::Setpoint};

const ID: &str = "sim";

/// Flight mode of the simulated flight controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlightMode {
    /// Initial mode, the vehicle does not move on its own
    Manual,
    /// Failsafe, the vehicle stops where it is
    Hold,
    /// The vehicle follows the streamed setpoints
    Offboard,
}

/// Point-mass model of a vehicle behind a flight controller that follows
/// the common offboard handshake: offboard mode is only granted while a
/// setpoint stream is alive, and is left as soon as the stream stalls.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    config: SimConfig,
    time: f64,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    mode: FlightMode,
    armed: bool,
    offboard_requested: bool,
    setpoint: Option<Setpoint>,
    last_setpoint_time: f64,
    stream_count: u32,
    setpoints_received: u64,
}

impl SimVehicle {
    pub fn new(config: SimConfig) -> Self {
        Self {
            time: 0.0,
            position: Vector3::new(0.0, 0.0, config.initial_height),
            velocity: Vector3::zeros(),
            mode: FlightMode::Manual,
            armed: false,
            offboard_requested: false,
            setpoint: None,
            last_setpoint_time: f64::NEG_INFINITY,
            stream_count: 0,
            setpoints_received: 0,
            config,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_connected(&self) -> bool {
        self.time >= self.config.connect_after_s
    }

    pub fn setpoints_received(&self) -> u64 {
        self.setpoints_received
    }

    fn stream_alive(&self) -> bool {
        self.time - self.last_setpoint_time <= self.config.setpoint_timeout_s
    }

    fn streaming(&self) -> bool {
        self.stream_alive() && self.stream_count >= self.config.offboard_warmup_setpoints
    }

    pub fn receive_setpoint(&mut self, setpoint: Setpoint) {
        if self.stream_alive() {
            self.stream_count = self.stream_count.saturating_add(1);
        } else {
            self.stream_count = 1;
        }

        self.setpoint = Some(setpoint);
        self.last_setpoint_time = self.time;
        self.setpoints_received += 1;

        if self.offboard_requested && self.mode != FlightMode::Offboard && self.streaming() {
            info!("[{}] Setpoint stream established, entering offboard", ID);
            self.mode = FlightMode::Offboard;
        }
    }

    /// Returns whether the mode was changed right away. An offboard
    /// request made before the stream is established is remembered and
    /// granted once it is.
    pub fn set_mode(&mut self, mode: &str) -> bool {
        match mode {
            OFFBOARD_MODE => {
                self.offboard_requested = true;
                if self.streaming() {
                    self.mode = FlightMode::Offboard;
                    true
                } else {
                    info!("[{}] Offboard requested without setpoint stream", ID);
                    false
                }
            }
            "AUTO.LOITER" | "HOLD" => {
                self.offboard_requested = false;
                self.mode = FlightMode::Hold;
                true
            }
            "MANUAL" => {
                self.offboard_requested = false;
                self.mode = FlightMode::Manual;
                true
            }
            _ => {
                warn!("[{}] Unknown mode {}", ID, mode);
                false
            }
        }
    }

    pub fn arm(&mut self, arm: bool) -> bool {
        if !self.is_connected() {
            return false;
        }

        self.armed = arm;
        true
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.time += dt;

        if self.mode == FlightMode::Offboard && !self.stream_alive() {
            warn!("[{}] Setpoint stream lost, falling back to hold", ID);
            self.mode = FlightMode::Hold;
            self.offboard_requested = false;
        }

        self.velocity = match (self.armed, self.mode, self.setpoint) {
            (true, FlightMode::Offboard, Some(Setpoint::Position(sp))) => {
                (sp.position() - self.position) * self.config.position_gain
            }
            (true, FlightMode::Offboard, Some(Setpoint::Velocity(sp))) => sp.linear,
            _ => Vector3::zeros(),
        }
        .cap_magnitude(self.config.max_speed);

        self.position += self.velocity * dt;

        // Ground
        if self.position.z < 0.0 {
            self.position.z = 0.0;
            self.velocity.z = self.velocity.z.max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::types::setpoint::{PositionSetpoint, VelocitySetpoint};

    fn config() -> SimConfig {
        SimConfig {
            connect_after_s: 0.0,
            offboard_warmup_setpoints: 3,
            ..Default::default()
        }
    }

    fn hover() -> Setpoint {
        Setpoint::Position(PositionSetpoint::new(0.0, 0.0, 2.0))
    }

    #[test]
    fn offboard_rejected_without_stream_then_granted() {
        let mut vehicle = SimVehicle::new(config());

        assert!(!vehicle.set_mode(OFFBOARD_MODE));
        assert_eq!(vehicle.mode(), FlightMode::Manual);

        for _ in 0..3 {
            vehicle.step(0.05);
            vehicle.receive_setpoint(hover());
        }

        assert_eq!(vehicle.mode(), FlightMode::Offboard);
    }

    #[test]
    fn offboard_accepted_while_streaming() {
        let mut vehicle = SimVehicle::new(config());

        for _ in 0..3 {
            vehicle.receive_setpoint(hover());
            vehicle.step(0.05);
        }

        assert!(vehicle.set_mode(OFFBOARD_MODE));
        assert_eq!(vehicle.mode(), FlightMode::Offboard);
    }

    #[test]
    fn stalled_stream_falls_back_to_hold() {
        let mut vehicle = SimVehicle::new(config());
        vehicle.arm(true);
        vehicle.set_mode(OFFBOARD_MODE);

        for _ in 0..3 {
            vehicle.receive_setpoint(hover());
            vehicle.step(0.05);
        }
        assert_eq!(vehicle.mode(), FlightMode::Offboard);

        for _ in 0..20 {
            vehicle.step(0.05);
        }
        assert_eq!(vehicle.mode(), FlightMode::Hold);
        assert_eq!(vehicle.velocity(), Vector3::zeros());
    }

    #[test]
    fn climbs_toward_position_setpoint() {
        let mut vehicle = SimVehicle::new(config());
        vehicle.arm(true);
        vehicle.set_mode(OFFBOARD_MODE);

        for _ in 0..400 {
            vehicle.receive_setpoint(hover());
            vehicle.step(0.05);
        }

        assert_relative_eq!(vehicle.position().z, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn follows_velocity_setpoint() {
        let mut vehicle = SimVehicle::new(SimConfig {
            initial_height: 2.0,
            ..config()
        });
        vehicle.arm(true);
        vehicle.set_mode(OFFBOARD_MODE);

        let forward = Setpoint::Velocity(VelocitySetpoint::linear(0.3, 0.0, 0.0));
        for _ in 0..20 {
            vehicle.receive_setpoint(forward);
            vehicle.step(0.05);
        }

        assert_relative_eq!(vehicle.velocity().x, 0.3);
        assert_relative_eq!(vehicle.position().z, 2.0);
        assert!(vehicle.position().x > 0.0);
    }

    #[test]
    fn does_not_move_unless_armed() {
        let mut vehicle = SimVehicle::new(config());
        vehicle.set_mode(OFFBOARD_MODE);

        for _ in 0..20 {
            vehicle.receive_setpoint(hover());
            vehicle.step(0.05);
        }

        assert_eq!(vehicle.position(), Vector3::zeros());
    }

    #[test]
    fn arming_requires_connection() {
        let mut vehicle = SimVehicle::new(SimConfig {
            connect_after_s: 1.0,
            ..config()
        });

        assert!(!vehicle.arm(true));
        for _ in 0..25 {
            vehicle.step(0.05);
        }
        assert!(vehicle.arm(true));
        assert!(vehicle.is_armed());
    }
}
