//! Per-game time settings

use std::time::Duration;

use crate::clamp_secs;

/// Static time budget for a game.
///
/// Immutable for the life of a game. When both `main_time` and `byo_length`
/// are zero the clock is disabled: nothing is displayed, no countdown plays
/// and no timeout is ever requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBudget {
    /// Main time allotment
    pub main_time: Duration,
    /// Length of one byoyomi period
    pub byo_length: Duration,
    /// Number of byoyomi periods
    pub byo_periods: u32,
    /// Minimum time charged per move. Server policy, carried for the session
    /// controller only.
    pub minimal_use: Duration,
    /// Whether countdown cues are played
    pub sound_enabled: bool,
}

impl TimeBudget {
    pub fn new(main_time: Duration, byo_length: Duration, byo_periods: u32) -> Self {
        TimeBudget {
            main_time,
            byo_length,
            byo_periods,
            minimal_use: Duration::ZERO,
            sound_enabled: true,
        }
    }

    /// A budget with no clock at all
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 0)
    }

    /// Build from raw wire figures in seconds.
    /// Negative or NaN values clamp to zero, `+inf` saturates.
    pub fn from_secs_f64(
        main_secs: f64,
        byo_length_secs: f64,
        byo_periods: i64,
        minimal_use_secs: f64,
        sound_enabled: bool,
    ) -> Self {
        TimeBudget {
            main_time: clamp_secs(main_secs),
            byo_length: clamp_secs(byo_length_secs),
            byo_periods: byo_periods.clamp(0, u32::MAX as i64) as u32,
            minimal_use: clamp_secs(minimal_use_secs),
            sound_enabled,
        }
    }

    pub fn with_minimal_use(mut self, minimal_use: Duration) -> Self {
        self.minimal_use = minimal_use;
        self
    }

    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// True when neither main time nor byoyomi is configured
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.main_time.is_zero() && self.byo_length.is_zero()
    }

    /// Common 1 hour + 5 x 30s setting
    pub fn standard() -> Self {
        Self::new(Duration::from_secs(3600), Duration::from_secs(30), 5)
    }

    /// Fast game: 10 minutes + 3 x 30s
    pub fn blitz() -> Self {
        Self::new(Duration::from_secs(600), Duration::from_secs(30), 3)
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_budget() {
        assert!(TimeBudget::disabled().is_disabled());
        assert!(TimeBudget::default().is_disabled());

        // Byoyomi-only is a running clock
        let byo_only = TimeBudget::new(Duration::ZERO, Duration::from_secs(30), 3);
        assert!(!byo_only.is_disabled());

        // Main-only too
        let main_only = TimeBudget::new(Duration::from_secs(60), Duration::ZERO, 0);
        assert!(!main_only.is_disabled());
    }

    #[test]
    fn test_from_secs_clamps_malformed_input() {
        let budget = TimeBudget::from_secs_f64(-5.0, f64::NAN, -2, -1.0, false);

        assert_eq!(budget.main_time, Duration::ZERO);
        assert_eq!(budget.byo_length, Duration::ZERO);
        assert_eq!(budget.byo_periods, 0);
        assert_eq!(budget.minimal_use, Duration::ZERO);
        assert!(!budget.sound_enabled);
        assert!(budget.is_disabled());
    }

    #[test]
    fn test_infinite_main_time_is_not_disabled() {
        let budget = TimeBudget::from_secs_f64(f64::INFINITY, 0.0, 0, 0.0, true);

        assert_eq!(budget.main_time, Duration::MAX);
        assert!(!budget.is_disabled());
    }

    #[test]
    fn test_builders() {
        let budget = TimeBudget::blitz()
            .with_minimal_use(Duration::from_secs(1))
            .with_sound(false);

        assert_eq!(budget.main_time, Duration::from_secs(600));
        assert_eq!(budget.byo_periods, 3);
        assert_eq!(budget.minimal_use, Duration::from_secs(1));
        assert!(!budget.sound_enabled);
    }
}
