use embassy_time::{Instant, Ticker};

use crate::{
    bridge::{dispatch, Inbound},
    consts::CONTROL_PERIOD,
    state::{ModeTriggerLatch, TelemetryMirror},
};

const ID: &str = "readiness";

/// Seconds between "still waiting" reports.
const REPORT_INTERVAL_SECS: u64 = 5;

/// Block until the flight controller reports a live link.
///
/// Inbound messages are dispatched on every poll, at the control rate.
/// There is no timeout: without a link, offboard control is unsafe, so
/// this never gives up. A single `connected` status is enough to pass,
/// even if a later message in the same dispatch reports a disconnect.
pub async fn wait_until_ready(
    inbound: &mut impl Inbound,
    mirror: &TelemetryMirror,
    trigger: &ModeTriggerLatch,
) {
    info!("[{}] Waiting for flight controller connection", ID);

    let start = Instant::now();
    let mut next_report = REPORT_INTERVAL_SECS;
    let mut ticker = Ticker::every(CONTROL_PERIOD);

    loop {
        let summary = dispatch(inbound, mirror, trigger);
        if summary.saw_connected || mirror.is_connected() {
            info!(
                "[{}] Flight controller connected after {} ms",
                ID,
                start.elapsed().as_millis()
            );
            return;
        }

        if start.elapsed().as_secs() >= next_report {
            warn!("[{}] Still no connection after {} s", ID, next_report);
            next_report += REPORT_INTERVAL_SECS;
        }

        ticker.next().await;
    }
}
