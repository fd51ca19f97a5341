//! Countdown cue edge detection

use std::time::Duration;

use byoclock_core::ceil_secs;

/// Cues play for the last this-many seconds of a period
pub const COUNTDOWN_WINDOW_SECS: u64 = 5;

/// Above this, the latch is considered stale and is cleared
pub const COUNTDOWN_SAFE_THRESHOLD: Duration = Duration::from_secs(6);

/// Countdown audio cue for the session controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    /// Whole seconds left in the current period (1..=5)
    Countdown(u8),
}

impl SoundCue {
    /// Asset name the session controller maps to a sound file
    pub fn name(&self) -> String {
        match self {
            SoundCue::Countdown(n) => format!("countdown_{}", n),
        }
    }

    pub fn seconds(&self) -> u8 {
        match self {
            SoundCue::Countdown(n) => *n,
        }
    }
}

/// Emits at most one cue per whole second in the terminal window of a period.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountdownSoundTrigger {
    /// (period index, second) of the last cue
    last_signaled: Option<(u32, u64)>,
}

impl CountdownSoundTrigger {
    pub fn new() -> Self {
        CountdownSoundTrigger {
            last_signaled: None,
        }
    }

    /// Observe one tick.
    ///
    /// `period_index` is `Some` only when main time is exhausted; cues never
    /// play while main time remains, even for periods shorter than the window.
    pub fn on_tick(
        &mut self,
        byoyomi_left: Duration,
        active: bool,
        paused: bool,
        sound_enabled: bool,
        period_index: Option<u32>,
    ) -> Option<SoundCue> {
        if !active || paused || byoyomi_left > COUNTDOWN_SAFE_THRESHOLD {
            self.reset();
            return None;
        }
        if !sound_enabled {
            return None;
        }
        let period_index = period_index?;

        let seconds_remaining = ceil_secs(byoyomi_left);
        if !(1..=COUNTDOWN_WINDOW_SECS).contains(&seconds_remaining) {
            return None;
        }
        if self.last_signaled == Some((period_index, seconds_remaining)) {
            return None;
        }

        self.last_signaled = Some((period_index, seconds_remaining));
        Some(SoundCue::Countdown(seconds_remaining as u8))
    }

    pub fn reset(&mut self) {
        self.last_signaled = None;
    }

    /// Second of the last emitted cue, if latched
    pub fn last_signaled_second(&self) -> Option<u64> {
        self.last_signaled.map(|(_, second)| second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_dedup_within_second() {
        let mut trigger = CountdownSoundTrigger::new();

        let cues: Vec<_> = [5400, 5000, 4900, 4000]
            .into_iter()
            .filter_map(|v| trigger.on_tick(ms(v), true, false, true, Some(0)))
            .collect();

        assert_eq!(cues, vec![SoundCue::Countdown(5), SoundCue::Countdown(4)]);
        assert_eq!(trigger.last_signaled_second(), Some(4));
    }

    #[test]
    fn test_full_countdown_at_ten_hertz() {
        let mut trigger = CountdownSoundTrigger::new();
        let mut cues = Vec::new();

        // 30s period ticking every 100ms down to zero
        let mut left = 30_000u64;
        loop {
            if let Some(cue) = trigger.on_tick(ms(left), true, false, true, Some(0)) {
                cues.push(cue.seconds());
            }
            if left == 0 {
                break;
            }
            left -= 100;
        }

        assert_eq!(cues, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_silent_outside_byoyomi() {
        let mut trigger = CountdownSoundTrigger::new();

        // 5s periods while main time still runs
        assert_eq!(trigger.on_tick(ms(5000), true, false, true, None), None);
        // Sound disabled
        assert_eq!(trigger.on_tick(ms(3000), true, false, false, Some(0)), None);
        // Not running
        assert_eq!(trigger.on_tick(ms(3000), false, false, true, Some(0)), None);
        // Exhausted
        assert_eq!(trigger.on_tick(Duration::ZERO, true, false, true, Some(0)), None);
    }

    #[test]
    fn test_reset_above_threshold() {
        let mut trigger = CountdownSoundTrigger::new();

        assert!(trigger.on_tick(ms(2500), true, false, true, Some(0)).is_some());
        // New period starts, latch clears
        assert_eq!(trigger.on_tick(ms(29_900), true, false, true, Some(1)), None);
        assert_eq!(trigger.last_signaled_second(), None);
        assert_eq!(
            trigger.on_tick(ms(2500), true, false, true, Some(1)),
            Some(SoundCue::Countdown(3))
        );
    }

    #[test]
    fn test_short_periods_cue_per_period() {
        let mut trigger = CountdownSoundTrigger::new();

        // 1s periods never rise above the threshold; the period index keeps
        // each period's cue distinct.
        assert!(trigger.on_tick(ms(900), true, false, true, Some(0)).is_some());
        assert!(trigger.on_tick(ms(500), true, false, true, Some(0)).is_none());
        assert!(trigger.on_tick(ms(900), true, false, true, Some(1)).is_some());
    }

    #[test]
    fn test_deactivation_clears_latch() {
        let mut trigger = CountdownSoundTrigger::new();

        assert!(trigger.on_tick(ms(4000), true, false, true, Some(0)).is_some());
        trigger.on_tick(ms(4000), false, false, true, Some(0));
        assert_eq!(trigger.last_signaled_second(), None);

        // Resumed at the same second: the cue plays again
        assert!(trigger.on_tick(ms(4000), true, false, true, Some(0)).is_some());

        // Pause clears it as well
        assert_eq!(trigger.on_tick(ms(3500), true, true, true, Some(0)), None);
        assert_eq!(trigger.last_signaled_second(), None);
    }

    #[test]
    fn test_cue_names() {
        assert_eq!(SoundCue::Countdown(5).name(), "countdown_5");
        assert_eq!(SoundCue::Countdown(1).name(), "countdown_1");
        // Names follow the carried second
        assert_eq!(SoundCue::Countdown(9).name(), "countdown_9");
    }
}
