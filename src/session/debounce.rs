use std::time::{Duration, Instant};

use tracing::debug;

/// Suppresses a duplicate input trigger (same key + modifier signature)
/// arriving within a short window, absorbing double dispatch from
/// overlapping listeners.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer { window, last: None }
    }

    /// Whether a trigger with this signature should be handled at `now`.
    /// A different signature always passes; the same signature passes only
    /// once the window has elapsed.
    pub fn accept(&mut self, signature: &str, now: Instant) -> bool {
        if let Some((last_sig, last_at)) = &self.last
            && last_sig == signature
            && now.duration_since(*last_at) < self.window
        {
            debug!(signature, "duplicate trigger suppressed");
            return false;
        }
        self.last = Some((signature.to_string(), now));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_inside_window_is_suppressed() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(debouncer.accept("ctrl+d", t0));
        assert!(!debouncer.accept("ctrl+d", t0 + Duration::from_millis(40)));
    }

    #[test]
    fn duplicate_after_window_passes() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(debouncer.accept("ctrl+d", t0));
        assert!(debouncer.accept("ctrl+d", t0 + Duration::from_millis(150)));
    }

    #[test]
    fn different_signature_passes_immediately() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(debouncer.accept("ctrl+d", t0));
        assert!(debouncer.accept("alt+up", t0 + Duration::from_millis(5)));
        // The accepted trigger resets the window for its own signature
        assert!(!debouncer.accept("alt+up", t0 + Duration::from_millis(10)));
    }
}
