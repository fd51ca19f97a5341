//! Exhaustion edge detection

use std::time::Duration;

/// Request for the session controller to perform the authoritative forfeit.
/// The controller corrects the clock afterwards with a fresh snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutRequest;

/// One-shot latch over the exhaustion predicate.
///
/// Emits once on the rising edge, stays silent while exhaustion holds, and
/// re-arms as soon as exhaustion is no longer observed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutDetector {
    fired: bool,
}

impl TimeoutDetector {
    pub fn new() -> Self {
        TimeoutDetector { fired: false }
    }

    /// Observe one tick
    pub fn on_tick(
        &mut self,
        main_time_left: Duration,
        byoyomi_left: Duration,
        periods_left: u32,
        active: bool,
    ) -> Option<TimeoutRequest> {
        let exhausted =
            active && main_time_left.is_zero() && periods_left == 0 && byoyomi_left.is_zero();

        match (exhausted, self.fired) {
            (true, false) => {
                self.fired = true;
                Some(TimeoutRequest)
            }
            (true, true) => None,
            (false, _) => {
                self.fired = false;
                None
            }
        }
    }

    /// Re-arm without observing a tick (clock stopped)
    pub fn clear(&mut self) {
        self.fired = false;
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: Duration = Duration::ZERO;

    #[test]
    fn test_fires_once_while_exhausted() {
        let mut detector = TimeoutDetector::new();

        let fired = (0..5)
            .filter_map(|_| detector.on_tick(ZERO, ZERO, 0, true))
            .count();

        assert_eq!(fired, 1);
        assert!(detector.has_fired());
    }

    #[test]
    fn test_rearms_after_recovery() {
        let mut detector = TimeoutDetector::new();

        assert!(detector.on_tick(ZERO, ZERO, 0, true).is_some());
        assert!(detector.on_tick(ZERO, ZERO, 0, true).is_none());

        // Corrective snapshot grants a fresh period
        assert!(detector.on_tick(ZERO, Duration::from_secs(30), 1, true).is_none());
        assert!(!detector.has_fired());

        let fired = (0..5)
            .filter_map(|_| detector.on_tick(ZERO, ZERO, 0, true))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_inactive_never_fires() {
        let mut detector = TimeoutDetector::new();

        assert!(detector.on_tick(ZERO, ZERO, 0, false).is_none());
        assert!(!detector.has_fired());
    }

    #[test]
    fn test_partial_exhaustion_is_not_timeout() {
        let mut detector = TimeoutDetector::new();

        // Last period at zero but a period still counted
        assert!(detector.on_tick(ZERO, ZERO, 1, true).is_none());
        // Main time left
        assert!(detector.on_tick(Duration::from_millis(1), ZERO, 0, true).is_none());
    }
}
