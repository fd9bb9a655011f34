//! Seams between the control loop and the messaging bridge.
//!
//! The loop never talks to a transport directly. Inbound messages are
//! pulled through an [`Inbound`] source, setpoints go out through a
//! [`SetpointPublisher`] and the one-shot mode and arm requests through a
//! [`CommandClient`]. Tests drive all three with in-memory fakes.

mod queue;

pub use queue::{InboundQueue, INBOUND_QUEUE_LEN};

use crate::{
    errors::TransportError,
    state::{ModeTriggerLatch, TelemetryMirror},
    types::{
        messages::{ArmRequest, ArmResponse, InboundMessage, SetModeRequest, SetModeResponse},
        setpoint::Setpoint,
    },
};

/// Upper bound of messages applied by a single [`dispatch`] call, so a
/// flooding producer cannot stall the control tick.
pub const MAX_DISPATCH_BATCH: usize = 64;

/// Non-blocking source of inbound messages.
pub trait Inbound {
    /// The next pending message, or `None` if nothing is queued.
    fn try_next(&mut self) -> Option<InboundMessage>;
}

/// Outbound setpoint streams.
pub trait SetpointPublisher {
    fn publish(&mut self, setpoint: &Setpoint) -> Result<(), TransportError>;
}

/// One-shot service calls to the flight controller. No timeout is applied,
/// a hung call blocks the caller.
#[allow(async_fn_in_trait)]
pub trait CommandClient {
    async fn set_mode(&mut self, request: SetModeRequest)
        -> Result<SetModeResponse, TransportError>;
    async fn arm(&mut self, request: ArmRequest) -> Result<ArmResponse, TransportError>;
}

impl<T: Inbound> Inbound for &mut T {
    fn try_next(&mut self) -> Option<InboundMessage> {
        T::try_next(self)
    }
}

impl<T: SetpointPublisher> SetpointPublisher for &mut T {
    fn publish(&mut self, setpoint: &Setpoint) -> Result<(), TransportError> {
        T::publish(self, setpoint)
    }
}

impl<T: CommandClient> CommandClient for &mut T {
    async fn set_mode(
        &mut self,
        request: SetModeRequest,
    ) -> Result<SetModeResponse, TransportError> {
        T::set_mode(self, request).await
    }

    async fn arm(&mut self, request: ArmRequest) -> Result<ArmResponse, TransportError> {
        T::arm(self, request).await
    }
}

/// What a single [`dispatch`] call applied.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub messages: usize,
    /// Whether any `connected = true` status was applied, even one that a
    /// later message in the same batch overwrote.
    pub saw_connected: bool,
}

/// Apply all pending inbound messages to the state caches.
pub fn dispatch(
    inbound: &mut impl Inbound,
    mirror: &TelemetryMirror,
    trigger: &ModeTriggerLatch,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    while summary.messages < MAX_DISPATCH_BATCH {
        let Some(message) = inbound.try_next() else {
            break;
        };

        match message {
            InboundMessage::LinkStatus(status) => {
                summary.saw_connected |= status.connected;
                mirror.update_link_status(status.connected);
            }
            InboundMessage::Pose(pose) => mirror.update_height(pose.height()),
            InboundMessage::ModeTrigger(flag) => trigger.set_active(flag.active),
        }

        summary.messages += 1;
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::types::messages::{LinkStatus, ModeTrigger, Pose};

    struct Script(VecDeque<InboundMessage>);

    impl Inbound for Script {
        fn try_next(&mut self) -> Option<InboundMessage> {
            self.0.pop_front()
        }
    }

    fn script(messages: impl IntoIterator<Item = InboundMessage>) -> Script {
        Script(messages.into_iter().collect())
    }

    #[test]
    fn applies_every_message_in_order() {
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();

        let mut inbound = script([
            LinkStatus { connected: true }.into(),
            Pose::from_height(1.0).into(),
            Pose::from_height(1.5).into(),
            ModeTrigger { active: true }.into(),
        ]);

        let summary = dispatch(&mut inbound, &mirror, &trigger);

        assert_eq!(summary.messages, 4);
        assert!(summary.saw_connected);
        assert!(mirror.is_connected());
        assert_eq!(mirror.current_height(), 1.5);
        assert!(trigger.is_active());
    }

    #[test]
    fn transient_connection_is_reported() {
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();

        let mut inbound = script([
            LinkStatus { connected: true }.into(),
            LinkStatus { connected: false }.into(),
        ]);

        let summary = dispatch(&mut inbound, &mirror, &trigger);

        assert!(summary.saw_connected);
        assert!(!mirror.is_connected());
    }

    #[test]
    fn empty_source_changes_nothing() {
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();

        let summary = dispatch(&mut script([]), &mirror, &trigger);

        assert_eq!(summary, DispatchSummary::default());
        assert_eq!(mirror.current_height(), 0.0);
        assert!(!mirror.is_connected());
        assert!(!trigger.is_active());
    }

    #[test]
    fn batch_is_bounded() {
        let mirror = TelemetryMirror::new();
        let trigger = ModeTriggerLatch::new();

        let mut inbound = script((0..MAX_DISPATCH_BATCH + 10).map(|i| Pose::from_height(i as f64).into()));

        assert_eq!(dispatch(&mut inbound, &mirror, &trigger).messages, MAX_DISPATCH_BATCH);
        assert_eq!(dispatch(&mut inbound, &mirror, &trigger).messages, 10);
        assert_eq!(mirror.current_height(), (MAX_DISPATCH_BATCH + 9) as f64);
    }
}
