//! Local wall-clock measurement since the last authoritative reference point

use std::time::{Duration, Instant};

/// Measures time since the tracked player last became active, was resumed,
/// or received a fresh snapshot.
///
/// INVARIANT: elapsed is only meaningful while the player's clock runs;
/// a stopped tracker always reports zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElapsedTracker {
    /// Instant of the last reset, `None` while stopped
    reference: Option<Instant>,
}

impl ElapsedTracker {
    /// A stopped tracker
    pub fn new() -> Self {
        ElapsedTracker { reference: None }
    }

    /// Restart measurement from `now`
    pub fn reset(&mut self, now: Instant) {
        self.reference = Some(now);
    }

    /// Stop measuring; elapsed reads zero until the next reset
    pub fn stop(&mut self) {
        self.reference = None;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.reference.is_some()
    }

    /// Time since the last reset. Saturates at zero if `now` is before the
    /// reference (clock sources disagreeing by a few micros).
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.reference {
            Some(reference) => now.saturating_duration_since(reference),
            None => Duration::ZERO,
        }
    }

    pub fn reference(&self) -> Option<Instant> {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_tracker_reads_zero() {
        let tracker = ElapsedTracker::new();
        let later = Instant::now() + Duration::from_secs(10);

        assert!(!tracker.is_running());
        assert_eq!(tracker.elapsed(later), Duration::ZERO);
    }

    #[test]
    fn test_reset_and_elapsed() {
        let start = Instant::now();
        let mut tracker = ElapsedTracker::new();
        tracker.reset(start);

        assert_eq!(tracker.elapsed(start + Duration::from_millis(1500)), Duration::from_millis(1500));

        // Fresh reference drops the accumulated measurement
        tracker.reset(start + Duration::from_secs(2));
        assert_eq!(tracker.elapsed(start + Duration::from_secs(3)), Duration::from_secs(1));

        tracker.stop();
        assert_eq!(tracker.elapsed(start + Duration::from_secs(4)), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_saturates_backwards() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut tracker = ElapsedTracker::new();
        tracker.reset(start);

        assert_eq!(tracker.elapsed(start - Duration::from_millis(5)), Duration::ZERO);
    }
}
