use std::sync::atomic::{AtomicBool, Ordering};

/// The key that stops the logger, compared case-insensitively.
pub const KILL_KEY: &str = "q";

/// A one-way flag: once a stop has been requested it can never be withdrawn.
///
/// The callback sets it, the driver loop polls it. Both normally run on the same thread, but the
/// flag is atomic so that a source delivering events on another thread stays sound.
#[derive(Debug, Default)]
pub struct KillSwitch {
    requested: AtomicBool,
}

impl KillSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Returns `true` if this call flipped the switch.
    pub fn trigger(&self) -> bool {
        !self.requested.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Whether a key-down producing `key_text` should stop the logger.
    ///
    /// Only the bare letter matches; modifiers are not taken into account.
    pub fn is_kill_key(key_text: &str) -> bool {
        key_text.to_lowercase() == KILL_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released() {
        assert!(!KillSwitch::new().is_triggered());
    }

    #[test]
    fn trigger_is_one_way() {
        let switch = KillSwitch::new();

        assert!(switch.trigger());
        assert!(switch.is_triggered());
        assert!(!switch.trigger());
        assert!(switch.is_triggered());
    }

    #[test]
    fn kill_key_is_case_insensitive() {
        assert!(KillSwitch::is_kill_key("q"));
        assert!(KillSwitch::is_kill_key("Q"));
        assert!(!KillSwitch::is_kill_key("a"));
        assert!(!KillSwitch::is_kill_key("qq"));
        assert!(!KillSwitch::is_kill_key("<keycode 12>"));
    }
}
