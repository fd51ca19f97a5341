//! Reconciled time and display primitives
//!
//! All quantities are non-negative durations. Fractional seconds are carried
//! internally; display rounds up so a player is never shown `0:00` while time
//! genuinely remains.

use std::fmt::Write;
use std::time::Duration;

/// Convert raw seconds to a duration. Negative and NaN input clamps to zero;
/// `+inf` and anything too large for a `Duration` saturates to `Duration::MAX`.
#[inline]
pub fn clamp_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Whole seconds, rounded up
#[inline]
pub fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// Format a remaining time as `M:SS`, or `H:MM:SS` from one hour up.
/// Rounds up to the next whole second.
pub fn format_clock(d: Duration) -> String {
    let total = ceil_secs(d);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::with_capacity(8);
    if hours > 0 {
        let _ = write!(out, "{}:{:02}:{:02}", hours, minutes, seconds);
    } else {
        let _ = write!(out, "{}:{:02}", minutes, seconds);
    }
    out
}

/// Live countdown values derived from the last snapshot and local elapsed time.
/// Ephemeral: recomputed on every tick, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ReconciledTime {
    pub main_time_left: Duration,
    pub byoyomi_left: Duration,
    pub periods_left: u32,
    /// Periods consumed after local rollover
    pub periods_used: u32,
    /// Main time is exhausted and byoyomi is counting
    pub in_byoyomi: bool,
}

impl ReconciledTime {
    /// Every allotment is gone
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.main_time_left.is_zero() && self.periods_left == 0 && self.byoyomi_left.is_zero()
    }

    /// Main time in whole seconds, rounded up
    #[inline]
    pub fn display_main(&self) -> u64 {
        ceil_secs(self.main_time_left)
    }

    /// Byoyomi in whole seconds, rounded up
    #[inline]
    pub fn display_byoyomi(&self) -> u64 {
        ceil_secs(self.byoyomi_left)
    }

    /// Zero-based index of the period currently counting down
    #[inline]
    pub fn period_index(&self) -> u32 {
        self.periods_used
    }

    /// Human-readable clock face, e.g. `12:04` or `0:23 (3)`
    pub fn label(&self) -> String {
        if self.in_byoyomi {
            format!("{} ({})", format_clock(self.byoyomi_left), self.periods_left)
        } else if self.periods_left > 0 {
            format!(
                "{} + {}x{}s",
                format_clock(self.main_time_left),
                self.periods_left,
                ceil_secs(self.byoyomi_left)
            )
        } else {
            format_clock(self.main_time_left)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_secs() {
        assert_eq!(clamp_secs(-1.0), Duration::ZERO);
        assert_eq!(clamp_secs(f64::NAN), Duration::ZERO);
        assert_eq!(clamp_secs(f64::NEG_INFINITY), Duration::ZERO);
        assert_eq!(clamp_secs(f64::INFINITY), Duration::MAX);
        assert_eq!(clamp_secs(1.5), Duration::from_millis(1500));
        assert_eq!(clamp_secs(1e30), Duration::MAX);
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::ZERO), 0);
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::from_secs(5)), 5);
        assert_eq!(ceil_secs(Duration::from_millis(5400)), 6);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::ZERO), "0:00");
        assert_eq!(format_clock(Duration::from_millis(100)), "0:01");
        assert_eq!(format_clock(Duration::from_secs(65)), "1:05");
        assert_eq!(format_clock(Duration::from_millis(59_001)), "1:00");
        assert_eq!(format_clock(Duration::from_secs(3600 + 61)), "1:01:01");
    }

    #[test]
    fn test_exhausted() {
        assert!(ReconciledTime::default().is_exhausted());

        let live = ReconciledTime {
            byoyomi_left: Duration::from_millis(1),
            periods_left: 1,
            in_byoyomi: true,
            ..Default::default()
        };
        assert!(!live.is_exhausted());
    }

    #[test]
    fn test_label() {
        let byo = ReconciledTime {
            byoyomi_left: Duration::from_millis(22_300),
            periods_left: 3,
            in_byoyomi: true,
            ..Default::default()
        };
        assert_eq!(byo.label(), "0:23 (3)");

        let main = ReconciledTime {
            main_time_left: Duration::from_secs(724),
            byoyomi_left: Duration::from_secs(30),
            periods_left: 5,
            ..Default::default()
        };
        assert_eq!(main.label(), "12:04 + 5x30s");
    }

    proptest! {
        #[test]
        fn prop_display_never_zero_while_time_remains(nanos in 1u64..10_000_000_000_000) {
            let d = Duration::from_nanos(nanos);
            prop_assert!(ceil_secs(d) >= 1);
            prop_assert_ne!(format_clock(d), "0:00");
        }
    }
}
