//! Software-in-the-loop flight controller.
//!
//! [`SimHandle`] stands in for the far side of the messaging bridge: it
//! accepts setpoints and service calls from the control loop, and a stepper
//! thread feeds link status, pose and a scripted mode trigger back through
//! an [`InboundQueue`].

use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    thread::JoinHandle,
    time::Duration,
};

mod config;
mod vehicle;

pub use config::{load_from_file_path, SimConfig, TriggerEvent};
pub use vehicle::{FlightMode, SimVehicle};

use crate::{
    bridge::{CommandClient, InboundQueue, SetpointPublisher},
    errors::TransportError,
    types::{
        messages::{
            ArmRequest, ArmResponse, LinkStatus, ModeTrigger, Pose, SetModeRequest,
            SetModeResponse,
        },
        setpoint::Setpoint,
    },
};

const ID: &str = "sim";

#[derive(Clone)]
pub struct SimHandle {
    vehicle: Arc<RwLock<SimVehicle>>,
    config: SimConfig,
}

impl SimHandle {
    pub fn new(config: SimConfig) -> Result<Self, crate::errors::ConfigError> {
        config.validate()?;
        Ok(Self {
            vehicle: Arc::new(RwLock::new(SimVehicle::new(config.clone()))),
            config,
        })
    }

    // Poisoning is ignored, the vehicle state stays usable.
    fn read(&self) -> RwLockReadGuard<'_, SimVehicle> {
        self.vehicle.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SimVehicle> {
        self.vehicle.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the simulated vehicle.
    pub fn vehicle(&self) -> SimVehicle {
        self.read().clone()
    }

    /// Advance the simulation by one step and queue the resulting
    /// telemetry, including any scripted trigger change that came due.
    pub fn step(&self, queue: &InboundQueue, next_trigger: &mut usize) {
        let (time, connected, height) = {
            let mut vehicle = self.write();
            vehicle.step(self.config.step_dt());
            (vehicle.time(), vehicle.is_connected(), vehicle.position().z)
        };

        queue.send(LinkStatus { connected });
        queue.send(Pose::from_height(height));

        while let Some(event) = self.config.triggers.get(*next_trigger) {
            if event.at_s > time {
                break;
            }
            info!("[{}] Mode trigger -> {} at {:.2} s", ID, event.active, time);
            queue.send(ModeTrigger {
                active: event.active,
            });
            *next_trigger += 1;
        }
    }

    /// Run the simulation in real time on its own thread.
    pub fn spawn_stepper(&self, queue: Arc<InboundQueue>) -> JoinHandle<()> {
        let handle = self.clone();
        let period = Duration::from_secs_f64(self.config.step_dt());

        std::thread::spawn(move || {
            info!("[{}] Stepping at {} Hz", ID, handle.config.step_hz);
            let mut next_trigger = 0;
            loop {
                std::thread::sleep(period);
                handle.step(&queue, &mut next_trigger);
            }
        })
    }
}

impl SetpointPublisher for SimHandle {
    fn publish(&mut self, setpoint: &Setpoint) -> Result<(), TransportError> {
        let mut vehicle = self.write();
        if !vehicle.is_connected() {
            return Err(TransportError::Disconnected);
        }
        vehicle.receive_setpoint(*setpoint);
        Ok(())
    }
}

impl CommandClient for SimHandle {
    async fn set_mode(
        &mut self,
        request: SetModeRequest,
    ) -> Result<SetModeResponse, TransportError> {
        let mut vehicle = self.write();
        if !vehicle.is_connected() {
            return Err(TransportError::Disconnected);
        }
        Ok(SetModeResponse {
            mode_accepted: vehicle.set_mode(&request.mode),
        })
    }

    async fn arm(&mut self, request: ArmRequest) -> Result<ArmResponse, TransportError> {
        Ok(ArmResponse {
            success: self.write().arm(request.arm),
        })
    }
}
