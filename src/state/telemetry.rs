use crate::sync::watch::Watch;

/// Latest link status and height reported by the flight controller.
///
/// There is no staleness detection: if the bridge stops delivering, the
/// last known link status and height are reported forever.
pub struct TelemetryMirror {
    connected: Watch<bool>,
    height: Watch<f64>,
}

impl Default for TelemetryMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryMirror {
    pub const fn new() -> Self {
        Self {
            connected: Watch::new(false),
            height: Watch::new(0.0),
        }
    }

    pub fn update_link_status(&self, connected: bool) {
        self.connected.send(connected);
    }

    pub fn update_height(&self, z: f64) {
        self.height.send(z);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub fn current_height(&self) -> f64 {
        self.height.get()
    }
}
