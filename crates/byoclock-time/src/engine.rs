//! Game clock - orchestrates per-player trackers, reconciliation and latches

use std::time::Instant;

use byoclock_core::{Color, GameState, PlayerSnapshot, ReconciledTime, TimeBudget};
use tracing::{debug, info, trace};

use crate::{reconcile, CountdownSoundTrigger, ElapsedTracker, SoundCue, TimeoutDetector};

/// Side effects requested from the session controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// Play a countdown cue for `color`
    Beep { color: Color, cue: SoundCue },
    /// `color` ran out of time; request the authoritative forfeit
    Timeout { color: Color },
}

/// Latest computed values, read by presentation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClockView {
    pub active: Option<Color>,
    pub paused: bool,
    /// `None` when the clock is disabled
    pub times: Option<[ReconciledTime; 2]>,
}

impl ClockView {
    pub fn time(&self, color: Color) -> Option<&ReconciledTime> {
        self.times.as_ref().map(|t| &t[color.index()])
    }
}

/// Per-player engine state
#[derive(Clone, Copy, Debug, Default)]
struct PlayerClock {
    tracker: ElapsedTracker,
    sound: CountdownSoundTrigger,
    timeout: TimeoutDetector,
    last: ReconciledTime,
}

impl PlayerClock {
    fn stop(&mut self) {
        self.tracker.stop();
        self.sound.reset();
        self.timeout.clear();
    }
}

/// Client-side clock for one game.
///
/// INVARIANT: a snapshot and the elapsed reference it implies are replaced
/// in the same call, so no tick can mix an old measurement with a new
/// snapshot.
pub struct GameClock {
    /// Last authoritative state
    state: GameState,
    players: [PlayerClock; 2],
    /// Ticks that ran the pipeline
    ticks: u64,
}

impl GameClock {
    /// A clock with no game attached (disabled budget, nobody to move)
    pub fn new() -> Self {
        GameClock {
            state: GameState::default(),
            players: [PlayerClock::default(); 2],
            ticks: 0,
        }
    }

    /// A clock started from an initial state
    pub fn with_state(state: GameState, now: Instant) -> Self {
        let mut clock = Self::new();
        clock.apply_state(state, now);
        clock
    }

    /// Replace the authoritative state wholesale.
    ///
    /// The running player's elapsed reference restarts at `now` unless the
    /// delivery is identical to the state already held, in which case the
    /// running measurement is kept. Every other player is stopped and its
    /// latches cleared.
    ///
    /// The authority pushes advanced figures for a running clock, so an
    /// unchanged state is a re-send, not a new confirmation.
    pub fn apply_state(&mut self, state: GameState, now: Instant) {
        if state == self.state && self.players.iter().any(|p| p.tracker.is_running()) {
            trace!("duplicate game state ignored");
            return;
        }

        self.state = state;
        self.sync_trackers(now, true);

        debug!(
            active = ?self.state.active,
            paused = self.state.paused,
            disabled = self.state.budget.is_disabled(),
            "applied game state"
        );
    }

    /// Local pause toggle. Resuming restarts the running player's
    /// measurement; pausing discards it and stops every latch immediately.
    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.state.paused == paused {
            return;
        }
        self.state.paused = paused;
        self.sync_trackers(now, false);

        debug!(paused, "pause toggled locally");
    }

    pub fn pause(&mut self, now: Instant) {
        self.set_paused(true, now);
    }

    pub fn resume(&mut self, now: Instant) {
        self.set_paused(false, now);
    }

    /// Start, restart or stop each player's tracker to match the state
    fn sync_trackers(&mut self, now: Instant, fresh_snapshot: bool) {
        for color in Color::ALL {
            let running = self.state.is_running(color);
            let player = &mut self.players[color.index()];

            if running {
                if fresh_snapshot || !player.tracker.is_running() {
                    player.tracker.reset(now);
                }
            } else {
                player.stop();
            }

            player.last = reconcile(
                &self.state.budget,
                &self.state.players[color.index()],
                player.tracker.elapsed(now),
                self.state.is_active(color),
                self.state.paused,
            );

            // A correction that ends exhaustion re-arms the latch right away,
            // even if the player runs out again before the next tick
            if running && !player.last.is_exhausted() {
                player.timeout.clear();
            }
        }
    }

    /// Run one tick of the pipeline for the running player:
    /// elapsed -> reconcile -> countdown cue -> timeout latch.
    ///
    /// Returns no events when nobody's clock runs.
    pub fn tick(&mut self, now: Instant) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        let Some(color) = self.running_color() else {
            return events;
        };
        self.ticks += 1;

        let budget = self.state.budget;
        let snapshot = self.state.players[color.index()];
        let player = &mut self.players[color.index()];

        let elapsed = player.tracker.elapsed(now);
        let time = reconcile(&budget, &snapshot, elapsed, true, false);
        player.last = time;

        if let Some(cue) = player.sound.on_tick(
            time.byoyomi_left,
            true,
            false,
            budget.sound_enabled,
            time.in_byoyomi.then_some(time.period_index()),
        ) {
            trace!(%color, cue = %cue.name(), "countdown cue");
            events.push(ClockEvent::Beep { color, cue });
        }

        if player
            .timeout
            .on_tick(time.main_time_left, time.byoyomi_left, time.periods_left, true)
            .is_some()
        {
            info!(%color, periods_used = time.periods_used, "time exhausted, requesting timeout");
            events.push(ClockEvent::Timeout { color });
        }

        events
    }

    /// Player whose clock currently runs, if any
    pub fn running_color(&self) -> Option<Color> {
        self.state.active.filter(|c| self.state.is_running(*c))
    }

    pub fn is_running(&self) -> bool {
        self.running_color().is_some()
    }

    /// Live values for `color` at `now`; `None` when the clock is disabled
    pub fn display(&self, color: Color, now: Instant) -> Option<ReconciledTime> {
        if self.state.budget.is_disabled() {
            return None;
        }
        let player = &self.players[color.index()];
        Some(reconcile(
            &self.state.budget,
            self.state.player(color),
            player.tracker.elapsed(now),
            self.state.is_active(color),
            self.state.paused,
        ))
    }

    /// Values computed by the last tick or state change
    pub fn view(&self) -> ClockView {
        ClockView {
            active: self.state.active,
            paused: self.state.paused,
            times: (!self.state.budget.is_disabled())
                .then(|| [self.players[0].last, self.players[1].last]),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn budget(&self) -> &TimeBudget {
        &self.state.budget
    }

    pub fn snapshot(&self, color: Color) -> &PlayerSnapshot {
        self.state.player(color)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}
