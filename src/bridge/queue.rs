use std::sync::Arc;

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex as M,
    channel::{Channel, TrySendError},
};

use super::Inbound;
use crate::types::messages::{InboundMessage, LinkStatus};

const ID: &str = "inbound";

pub const INBOUND_QUEUE_LEN: usize = 32;

/// Bounded inbound message queue.
///
/// Producers may live on any thread and call [`InboundQueue::send`]; the
/// control loop drains it through the [`Inbound`] implementation during
/// dispatch, so the state caches are only ever written from the tick.
///
/// Sending never fails. When the queue is full, the queued messages are
/// coalesced down to the newest message of each kind, which leaves the
/// state caches exactly where draining every message would have left them.
/// A superseded `connected = true` is kept so the readiness check still
/// sees a connection that dropped again.
pub struct InboundQueue {
    chn: Channel<M, InboundMessage, INBOUND_QUEUE_LEN>,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundQueue {
    pub const fn new() -> Self {
        Self {
            chn: Channel::new(),
        }
    }

    /// Queue a message without blocking.
    pub fn send(&self, message: impl Into<InboundMessage>) {
        let mut message = message.into();
        loop {
            match self.chn.try_send(message) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    message = rejected;
                    self.coalesce();
                }
            }
        }
    }

    fn coalesce(&self) {
        let pending: Vec<InboundMessage> =
            core::iter::from_fn(|| self.chn.try_receive().ok()).collect();
        let kept = coalesced(&pending);

        debug!(
            "[{}] Queue full, coalesced {} messages into {}",
            ID,
            pending.len(),
            kept.len()
        );

        for message in kept {
            // Room was just made, a racing producer can at worst refill it
            if let Err(TrySendError::Full(message)) = self.chn.try_send(message) {
                warn!("[{}] Dropped {:?} while coalescing", ID, message);
            }
        }
    }

    fn try_receive(&self) -> Option<InboundMessage> {
        self.chn.try_receive().ok()
    }
}

/// The newest message of each kind, in arrival order.
fn coalesced(pending: &[InboundMessage]) -> Vec<InboundMessage> {
    let last_of = |pred: fn(&InboundMessage) -> bool| pending.iter().rposition(pred);

    let pose = last_of(|m| matches!(m, InboundMessage::Pose(_)));
    let trigger = last_of(|m| matches!(m, InboundMessage::ModeTrigger(_)));
    let link = last_of(|m| matches!(m, InboundMessage::LinkStatus(_)));
    let connected = last_of(|m| {
        matches!(m, InboundMessage::LinkStatus(LinkStatus { connected: true }))
    })
    .filter(|&index| Some(index) != link);

    let mut keep: Vec<usize> = [pose, trigger, link, connected]
        .into_iter()
        .flatten()
        .collect();
    keep.sort_unstable();

    keep.into_iter().map(|index| pending[index]).collect()
}

impl Inbound for &InboundQueue {
    fn try_next(&mut self) -> Option<InboundMessage> {
        self.try_receive()
    }
}

impl Inbound for Arc<InboundQueue> {
    fn try_next(&mut self) -> Option<InboundMessage> {
        self.try_receive()
    }
}
