//! Scenario runner - authority, delivery channel and client clock in lockstep
//!
//! Virtual time advances one tick interval per step. Each step:
//! 1. The authority completes scripted moves and pushes snapshots
//! 2. Snapshots due since the last step are applied to the client clock
//! 3. The client ticks; cues are recorded, timeouts are claimed
//! 4. The client display is compared with the authority's figures

use std::collections::HashSet;
use std::time::{Duration, Instant};

use byoclock_core::{Color, ReconciledTime, TimeBudget};
use byoclock_time::{reconcile, ClockEvent, GameClock};
use tracing::debug;

use crate::{Authority, DeliveryChannel, DeliveryConfig, DeliveryStats};

/// Total time a player has left: main time plus every unused period
pub fn remaining_budget(budget: &TimeBudget, time: &ReconciledTime) -> Duration {
    if time.is_exhausted() {
        Duration::ZERO
    } else if time.in_byoyomi {
        time.byoyomi_left + budget.byo_length * time.periods_left.saturating_sub(1)
    } else {
        time.main_time_left + budget.byo_length * time.periods_left
    }
}

/// A timeout request sent by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutClaim {
    pub color: Color,
    pub at: Duration,
    pub accepted: bool,
}

/// What happened during one run
#[derive(Clone, Debug, Default)]
pub struct SimulationReport {
    pub duration: Duration,
    pub moves_completed: u32,
    /// Moves the authority refused because the player had already run out
    pub refused_moves: u32,
    pub cues: u64,
    /// Cues repeated for the same move, period and second
    pub duplicate_cues: u64,
    pub claims: Vec<TimeoutClaim>,
    pub flagged: Option<Color>,
    /// First step at which the authority saw the player to move run out
    pub truth_exhausted_at: Option<Duration>,
    /// Largest amount the client display trailed the authority
    pub max_lag: Duration,
    pub lag_samples: u64,
    /// Client state equals the authority's once everything was delivered
    pub converged: bool,
    pub violations: Vec<String>,
    pub delivery: DeliveryStats,
}

impl SimulationReport {
    pub fn accepted_claims(&self) -> usize {
        self.claims.iter().filter(|c| c.accepted).count()
    }

    pub fn rejected_claims(&self) -> usize {
        self.claims.iter().filter(|c| !c.accepted).count()
    }

    /// Time from the authority's exhaustion to the accepted claim
    pub fn timeout_delay(&self) -> Option<Duration> {
        let truth = self.truth_exhausted_at?;
        let claim = self.claims.iter().find(|c| c.accepted)?;
        Some(claim.at.saturating_sub(truth))
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A scripted game under given delivery conditions
#[derive(Clone, Debug)]
pub struct Scenario {
    budget: TimeBudget,
    /// Think time of each move, black first. The player to move after the
    /// script ends never moves.
    think_times: Vec<Duration>,
    delivery: DeliveryConfig,
    tick_interval: Duration,
    push_interval: Duration,
    max_duration: Duration,
    seed: u64,
}

impl Scenario {
    pub fn budget(&self) -> &TimeBudget {
        &self.budget
    }

    pub fn delivery(&self) -> &DeliveryConfig {
        &self.delivery
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Run to the end of the game or `max_duration`
    pub fn run(&self) -> SimulationReport {
        let base = Instant::now();
        let mut authority = Authority::new(self.budget);
        let mut channel = DeliveryChannel::new(self.delivery.clone(), self.seed);
        let mut clock = GameClock::new();
        let mut report = SimulationReport::default();

        let mut script = self.think_times.iter().copied();
        let mut next_move_at = script.next();
        let mut next_push = Duration::ZERO;
        // Move number of the last snapshot the client applied
        let mut held_move: Option<u32> = None;
        let mut signaled = HashSet::new();

        let mut now = Duration::ZERO;
        while now <= self.max_duration {
            if report.truth_exhausted_at.is_none()
                && authority.flagged().is_none()
                && authority.is_exhausted_at(now)
            {
                report.truth_exhausted_at = Some(now);
            }

            if authority.flagged().is_none() && next_move_at.is_some_and(|at| now >= at) {
                if authority.complete_move(now) {
                    report.moves_completed += 1;
                    next_move_at = script.next().map(|think| now + think);
                } else {
                    report.refused_moves += 1;
                    next_move_at = None;
                }
                next_push = now;
            }

            if now >= next_push {
                channel.send(authority.state_at(now), authority.moves(), now);
                next_push = now + self.push_interval;
            }

            // Snapshots land between ticks, at their own arrival time
            for delivery in channel.deliver(now) {
                clock.apply_state(delivery.state, base + delivery.deliver_at);
                held_move = Some(delivery.move_number);
            }

            for event in clock.tick(base + now) {
                match event {
                    ClockEvent::Beep { color, cue } => {
                        report.cues += 1;
                        let period = clock.view().time(color).map_or(0, |t| t.period_index());
                        if !signaled.insert((held_move, color, period, cue.seconds())) {
                            report.duplicate_cues += 1;
                        }
                    }
                    ClockEvent::Timeout { color } => {
                        let accepted = authority.claim_timeout(color, now);
                        debug!(%color, accepted, at = ?now, "timeout claimed");
                        report.claims.push(TimeoutClaim { color, at: now, accepted });
                        // Answer with the authoritative state right away
                        channel.send(authority.state_at(now), authority.moves(), now);
                        next_push = now + self.push_interval;
                    }
                }
            }

            self.compare(&authority, &clock, held_move, base, now, &mut report);

            // The client only stops once the game-over state reached it
            if authority.flagged().is_some() && !clock.is_running() {
                break;
            }
            now += self.tick_interval;
        }

        report.duration = now;
        report.flagged = authority.flagged();
        report.converged = *clock.state() == authority.state_at(now);
        report.delivery = channel.stats().clone();
        report
    }

    /// The client may trail the authority by at most the snapshot's delay,
    /// and must never run ahead of it.
    fn compare(
        &self,
        authority: &Authority,
        clock: &GameClock,
        held_move: Option<u32>,
        base: Instant,
        now: Duration,
        report: &mut SimulationReport,
    ) {
        if authority.flagged().is_some() || held_move != Some(authority.moves()) {
            return;
        }
        let Some(color) = authority.to_move() else {
            return;
        };
        let Some(client) = clock.display(color, base + now) else {
            return;
        };

        let state = authority.state_at(now);
        let truth = reconcile(&self.budget, state.player(color), Duration::ZERO, true, false);
        let client_left = remaining_budget(&self.budget, &client);
        let truth_left = remaining_budget(&self.budget, &truth);

        report.lag_samples += 1;
        if client_left < truth_left {
            report.violations.push(format!(
                "{now:?}: {color} client shows {client_left:?}, authority {truth_left:?}"
            ));
            return;
        }

        let lag = client_left - truth_left;
        report.max_lag = report.max_lag.max(lag);
        if lag > self.delivery.max_latency() {
            report.violations.push(format!(
                "{now:?}: {color} client trails by {lag:?}, beyond worst-case delivery"
            ));
        }
    }
}

/// Builder for a [`Scenario`]
pub struct ScenarioBuilder {
    budget: TimeBudget,
    think_times: Vec<Duration>,
    delivery: DeliveryConfig,
    tick_interval: Duration,
    push_interval: Duration,
    max_duration: Duration,
    seed: u64,
}

impl ScenarioBuilder {
    pub fn new(budget: TimeBudget) -> Self {
        ScenarioBuilder {
            budget,
            think_times: Vec::new(),
            delivery: DeliveryConfig::good(),
            tick_interval: Duration::from_millis(100),
            push_interval: Duration::from_secs(1),
            max_duration: Duration::from_secs(3600),
            seed: 0,
        }
    }

    /// Set the move script
    pub fn with_moves(mut self, think_times: impl IntoIterator<Item = Duration>) -> Self {
        self.think_times = think_times.into_iter().collect();
        self
    }

    /// Set delivery conditions
    pub fn with_delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }

    /// Set client tick interval
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set how often the authority pushes a snapshot between moves
    pub fn with_push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval;
        self
    }

    /// Set simulation time limit
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = duration;
        self
    }

    /// Set delivery seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Scenario {
        Scenario {
            budget: self.budget,
            think_times: self.think_times,
            delivery: self.delivery,
            tick_interval: self.tick_interval.max(Duration::from_millis(1)),
            push_interval: self.push_interval,
            max_duration: self.max_duration,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_remaining_budget_continuous_across_phases() {
        let budget = TimeBudget::new(secs(10), secs(30), 3);
        let snapshot = Default::default();

        let at = |e: u64| {
            remaining_budget(&budget, &reconcile(&budget, &snapshot, secs(e), true, false))
        };
        assert_eq!(at(0), secs(100));
        assert_eq!(at(10), secs(90));
        assert_eq!(at(40), secs(60));
        assert_eq!(at(41), secs(59));
        assert_eq!(at(100), Duration::ZERO);
        assert_eq!(at(500), Duration::ZERO);
    }

    #[test]
    fn test_perfect_delivery_has_no_lag() {
        let report = ScenarioBuilder::new(TimeBudget::new(secs(5), secs(10), 2))
            .with_delivery(DeliveryConfig::perfect())
            .with_moves([secs(3), secs(4)])
            .build()
            .run();

        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.max_lag, Duration::ZERO);
        assert_eq!(report.moves_completed, 2);
        assert_eq!(report.flagged, Some(Color::Black));
        assert_eq!(report.accepted_claims(), 1);
        assert_eq!(report.timeout_delay(), Some(Duration::ZERO));
        assert!(report.converged);
    }
}
