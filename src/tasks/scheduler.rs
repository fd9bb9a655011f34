//! Fixed-rate setpoint scheduler.
//!
//! The flight controller drops out of offboard mode when setpoints arrive
//! slower than [`MIN_SETPOINT_RATE_HZ`](crate::consts::MIN_SETPOINT_RATE_HZ),
//! so the 20 Hz rate here is a correctness requirement, not a tuning knob.
//! An overrunning tick only degrades the rate; it is reported and the loop
//! carries on.

use embassy_time::{Duration, Instant, Ticker};

use crate::{
    bridge::{dispatch, Inbound, SetpointPublisher},
    consts::{CONTROL_PERIOD, MAX_SETPOINT_GAP},
    control::{ControlMode, ControlModeMachine},
    state::{ModeTriggerLatch, TelemetryMirror},
    types::setpoint::Setpoint,
};

const ID: &str = "scheduler";

/// What a single tick did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TickReport {
    pub setpoint: Setpoint,
    pub mode: ControlMode,
    /// False if the bridge refused the setpoint
    pub published: bool,
}

/// Timing bookkeeping of the setpoint stream.
#[derive(Debug, Clone)]
pub struct RateMonitor {
    ticks: u64,
    overruns: u64,
    late_publishes: u64,
    last_publish: Option<Instant>,
    max_gap: Duration,
}

impl Default for RateMonitor {
    fn default() -> Self {
        Self {
            ticks: 0,
            overruns: 0,
            late_publishes: 0,
            last_publish: None,
            max_gap: Duration::from_ticks(0),
        }
    }
}

impl RateMonitor {
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Publishes that came later than the flight controller tolerates.
    pub fn late_publishes(&self) -> u64 {
        self.late_publishes
    }

    /// Longest observed time between two successful publishes.
    pub fn max_gap(&self) -> Duration {
        self.max_gap
    }

    fn record_tick(&mut self, started: Instant) {
        self.ticks += 1;

        let busy = started.elapsed();
        if busy > CONTROL_PERIOD {
            self.overruns += 1;
            warn!(
                "[{}] Tick {} overran its period: {} ms",
                ID,
                self.ticks,
                busy.as_millis()
            );
        }
    }

    fn record_publish(&mut self, now: Instant) {
        if let Some(last) = self.last_publish.replace(now) {
            let gap = now - last;
            self.max_gap = self.max_gap.max(gap);

            if gap > MAX_SETPOINT_GAP {
                self.late_publishes += 1;
                error!(
                    "[{}] {} ms without a setpoint, offboard mode may be lost",
                    ID,
                    gap.as_millis()
                );
            }
        }
    }
}

pub struct Scheduler {
    monitor: RateMonitor,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            monitor: RateMonitor::default(),
        }
    }

    pub fn monitor(&self) -> &RateMonitor {
        &self.monitor
    }

    /// Dispatch pending inbound messages, then publish exactly one setpoint.
    pub fn tick(
        &mut self,
        inbound: &mut impl Inbound,
        publisher: &mut impl SetpointPublisher,
        mirror: &TelemetryMirror,
        trigger: &ModeTriggerLatch,
        machine: &mut ControlModeMachine,
    ) -> TickReport {
        let started = Instant::now();

        dispatch(inbound, mirror, trigger);
        let setpoint = machine.step(mirror, trigger);

        debug!("[{}] {}", ID, setpoint);

        let published = match publisher.publish(&setpoint) {
            Ok(()) => {
                self.monitor.record_publish(Instant::now());
                true
            }
            Err(error) => {
                error!("[{}] Failed to publish setpoint: {}", ID, error);
                false
            }
        };

        self.monitor.record_tick(started);

        TickReport {
            setpoint,
            mode: machine.mode(),
            published,
        }
    }

    /// Tick at the control rate until the process ends.
    pub async fn run(
        &mut self,
        inbound: &mut impl Inbound,
        publisher: &mut impl SetpointPublisher,
        mirror: &TelemetryMirror,
        trigger: &ModeTriggerLatch,
        machine: &mut ControlModeMachine,
    ) -> ! {
        info!("[{}] Streaming setpoints every {} ms", ID, CONTROL_PERIOD.as_millis());

        let mut ticker = Ticker::every(CONTROL_PERIOD);
        loop {
            self.tick(inbound, publisher, mirror, trigger, machine);
            ticker.next().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::TransportError,
        types::{
            messages::{InboundMessage, ModeTrigger, Pose},
            setpoint::PositionSetpoint,
        },
    };

    struct Nothing;

    impl Inbound for Nothing {
        fn try_next(&mut self) -> Option<InboundMessage> {
            None
        }
    }

    #[derive(Default)]
    struct Recorder {
        published: Vec<Setpoint>,
        refuse: bool,
        stall: Option<std::time::Duration>,
    }

    impl SetpointPublisher for Recorder {
        fn publish(&mut self, setpoint: &Setpoint) -> Result<(), TransportError> {
            if let Some(stall) = self.stall {
                std::thread::sleep(stall);
            }
            if self.refuse {
                return Err(TransportError::Disconnected);
            }
            self.published.push(*setpoint);
            Ok(())
        }
    }

    #[test]
    fn one_setpoint_per_tick() {
        let mut scheduler = Scheduler::new();
        let mut publisher = Recorder::default();
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();
        let mut machine = ControlModeMachine::new();

        for _ in 0..5 {
            scheduler.tick(&mut Nothing, &mut publisher, &mirror, &trigger, &mut machine);
        }

        assert_eq!(publisher.published.len(), 5);
        assert_eq!(scheduler.monitor().ticks(), 5);
    }

    #[test]
    fn dispatch_happens_before_the_state_machine() {
        let mut scheduler = Scheduler::new();
        let mut publisher = Recorder::default();
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();
        let mut machine = ControlModeMachine::new();

        let mut inbound = vec![
            InboundMessage::from(ModeTrigger { active: true }),
            InboundMessage::from(Pose::from_height(0.5)),
        ]
        .into_iter();

        struct Iter<'a>(&'a mut std::vec::IntoIter<InboundMessage>);
        impl Inbound for Iter<'_> {
            fn try_next(&mut self) -> Option<InboundMessage> {
                self.0.next()
            }
        }

        let report = scheduler.tick(
            &mut Iter(&mut inbound),
            &mut publisher,
            &mirror,
            &trigger,
            &mut machine,
        );

        assert_eq!(report.mode, ControlMode::VelocityHold);
        assert!(matches!(report.setpoint, Setpoint::Velocity(_)));
    }

    #[test]
    fn refused_publish_does_not_stop_the_loop() {
        let mut scheduler = Scheduler::new();
        let mut publisher = Recorder {
            refuse: true,
            ..Default::default()
        };
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();
        let mut machine = ControlModeMachine::new();

        let report = scheduler.tick(&mut Nothing, &mut publisher, &mirror, &trigger, &mut machine);
        assert!(!report.published);
        assert_eq!(
            report.setpoint,
            Setpoint::Position(PositionSetpoint::new(0.0, 0.0, 2.0))
        );

        publisher.refuse = false;
        let report = scheduler.tick(&mut Nothing, &mut publisher, &mirror, &trigger, &mut machine);
        assert!(report.published);
        assert_eq!(scheduler.monitor().ticks(), 2);
    }

    #[test]
    fn overrunning_tick_only_degrades_the_rate() {
        let mut scheduler = Scheduler::new();
        let mut publisher = Recorder {
            stall: Some(std::time::Duration::from_millis(
                2 * CONTROL_PERIOD.as_millis(),
            )),
            ..Default::default()
        };
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();
        let mut machine = ControlModeMachine::new();

        mirror.update_height(1.8);
        let report = scheduler.tick(&mut Nothing, &mut publisher, &mirror, &trigger, &mut machine);

        assert!(report.published);
        assert_eq!(report.mode, ControlMode::PositionHold);
        assert_eq!(scheduler.monitor().overruns(), 1);
        assert_eq!(machine.reference().value, 1.8);

        publisher.stall = None;
        trigger.set_active(true);
        mirror.update_height(1.5);
        let report = scheduler.tick(&mut Nothing, &mut publisher, &mirror, &trigger, &mut machine);

        assert!(report.published);
        assert_eq!(report.mode, ControlMode::VelocityHold);
        assert_eq!(publisher.published.len(), 2);
        assert_eq!(scheduler.monitor().ticks(), 2);
        assert_eq!(scheduler.monitor().overruns(), 1);
        assert_eq!(machine.reference().value, 1.8);
        match report.setpoint {
            Setpoint::Velocity(sp) => assert!((sp.linear.z - 0.3).abs() < 1e-12),
            Setpoint::Position(_) => panic!("expected a velocity setpoint"),
        }
    }
}
