use crate::{
    bridge::{CommandClient, Inbound, SetpointPublisher},
    control::ControlModeMachine,
    state::{ModeTriggerLatch, TelemetryMirror},
    tasks::{
        activation::{self, ActivationReport},
        readiness,
        scheduler::{RateMonitor, Scheduler, TickReport},
    },
};

const ID: &str = "controller";

/// Owner of all control-loop state and of the three bridge endpoints.
///
/// [`OffboardController::run`] waits for the link, activates offboard
/// control once and then streams setpoints forever. The individual steps
/// are public so they can be driven one at a time.
pub struct OffboardController<I, P, C> {
    mirror: TelemetryMirror,
    trigger: ModeTriggerLatch,
    machine: ControlModeMachine,
    scheduler: Scheduler,
    inbound: I,
    publisher: P,
    client: C,
}

impl<I: Inbound, P: SetpointPublisher, C: CommandClient> OffboardController<I, P, C> {
    pub fn new(inbound: I, publisher: P, client: C) -> Self {
        Self {
            mirror: TelemetryMirror::new(),
            trigger: ModeTriggerLatch::new(),
            machine: ControlModeMachine::new(),
            scheduler: Scheduler::new(),
            inbound,
            publisher,
            client,
        }
    }

    pub async fn run(&mut self) -> ! {
        info!("[{}] Starting offboard control", ID);

        self.wait_until_ready().await;

        // The outcome is only logged; the setpoint stream has to start
        // regardless of what the flight controller answered.
        let _ = self.activate().await;

        self.run_scheduler().await
    }

    pub async fn wait_until_ready(&mut self) {
        readiness::wait_until_ready(&mut self.inbound, &self.mirror, &self.trigger).await
    }

    pub async fn activate(&mut self) -> ActivationReport {
        activation::activate(&mut self.client).await
    }

    pub fn tick(&mut self) -> TickReport {
        self.scheduler.tick(
            &mut self.inbound,
            &mut self.publisher,
            &self.mirror,
            &self.trigger,
            &mut self.machine,
        )
    }

    pub async fn run_scheduler(&mut self) -> ! {
        self.scheduler
            .run(
                &mut self.inbound,
                &mut self.publisher,
                &self.mirror,
                &self.trigger,
                &mut self.machine,
            )
            .await
    }

    pub fn mirror(&self) -> &TelemetryMirror {
        &self.mirror
    }

    pub fn trigger(&self) -> &ModeTriggerLatch {
        &self.trigger
    }

    pub fn machine(&self) -> &ControlModeMachine {
        &self.machine
    }

    pub fn rate_monitor(&self) -> &RateMonitor {
        self.scheduler.monitor()
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
