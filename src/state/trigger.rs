use crate::sync::watch::Watch;

/// Latest externally supplied control-regime flag. `false` (the initial
/// value) selects position hold, `true` selects velocity hold.
pub struct ModeTriggerLatch {
    active: Watch<bool>,
}

impl Default for ModeTriggerLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeTriggerLatch {
    pub const fn new() -> Self {
        Self {
            active: Watch::new(false),
        }
    }

    pub fn set_active(&self, flag: bool) {
        self.active.send(flag);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}
