//! Snapshot delivery under bad network conditions
//!
//! Simulates the state-sync channel between authority and client:
//! - Latency with uniform jitter
//! - Loss
//! - Duplication
//!
//! Delivery stays in send order. The sync channel is an ordered stream, so
//! a late snapshot holds back everything sent after it.

use std::collections::VecDeque;
use std::time::Duration;

use byoclock_core::GameState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Delivery conditions
#[derive(Clone, Debug)]
pub struct DeliveryConfig {
    /// Base latency
    pub base_latency: Duration,
    /// Extra latency, uniform in `[min, max]` milliseconds
    pub jitter_ms: (u32, u32),
    /// Loss rate (0.0 - 1.0)
    pub loss_rate: f64,
    /// Duplicate probability
    pub duplicate_prob: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            base_latency: Duration::from_millis(50),
            jitter_ms: (0, 50),
            loss_rate: 0.01,
            duplicate_prob: 0.01,
        }
    }
}

impl DeliveryConfig {
    /// Instant delivery, nothing lost
    pub fn perfect() -> Self {
        DeliveryConfig {
            base_latency: Duration::ZERO,
            jitter_ms: (0, 0),
            loss_rate: 0.0,
            duplicate_prob: 0.0,
        }
    }

    /// Good network conditions
    pub fn good() -> Self {
        DeliveryConfig {
            base_latency: Duration::from_millis(20),
            jitter_ms: (0, 10),
            loss_rate: 0.0,
            duplicate_prob: 0.001,
        }
    }

    /// Poor network conditions
    pub fn poor() -> Self {
        DeliveryConfig {
            base_latency: Duration::from_millis(150),
            jitter_ms: (0, 250),
            loss_rate: 0.05,
            duplicate_prob: 0.02,
        }
    }

    /// Hostile network conditions
    pub fn hostile() -> Self {
        DeliveryConfig {
            base_latency: Duration::from_millis(400),
            jitter_ms: (0, 800),
            loss_rate: 0.2,
            duplicate_prob: 0.05,
        }
    }

    /// Worst-case latency of a single snapshot
    pub fn max_latency(&self) -> Duration {
        self.base_latency + Duration::from_millis(u64::from(self.jitter_ms.1))
    }

    pub fn is_lossless(&self) -> bool {
        self.loss_rate <= 0.0
    }
}

/// A snapshot in flight
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub state: GameState,
    /// Moves completed when the snapshot was taken
    pub move_number: u32,
    /// Authority time at send
    pub sent_at: Duration,
    /// Simulation time at delivery
    pub deliver_at: Duration,
    /// Sequence number (for tracking)
    pub seq: u64,
}

impl Delivery {
    pub fn latency(&self) -> Duration {
        self.deliver_at - self.sent_at
    }
}

/// Delivery statistics
#[derive(Clone, Debug, Default)]
pub struct DeliveryStats {
    pub sent: u64,
    pub delivered: u64,
    pub lost: u64,
    pub duplicated: u64,
    pub max_latency: Duration,
}

/// Lossy, late, in-order snapshot channel
pub struct DeliveryChannel {
    config: DeliveryConfig,
    rng: StdRng,
    in_flight: VecDeque<Delivery>,
    next_seq: u64,
    stats: DeliveryStats,
}

impl DeliveryChannel {
    /// Create a channel with seed
    pub fn new(config: DeliveryConfig, seed: u64) -> Self {
        DeliveryChannel {
            config,
            rng: StdRng::seed_from_u64(seed),
            in_flight: VecDeque::new(),
            next_seq: 0,
            stats: DeliveryStats::default(),
        }
    }

    /// Send a snapshot taken at `now`
    pub fn send(&mut self, state: GameState, move_number: u32, now: Duration) {
        self.stats.sent += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.config.loss_rate > 0.0 && self.rng.gen_bool(self.config.loss_rate.min(1.0)) {
            self.stats.lost += 1;
            return;
        }

        let (min, max) = self.config.jitter_ms;
        let jitter = Duration::from_millis(u64::from(self.rng.gen_range(min..=max.max(min))));
        // Never overtake what is already queued
        let earliest = self.in_flight.back().map_or(now, |d| d.deliver_at);
        let deliver_at = (now + self.config.base_latency + jitter).max(earliest);

        let delivery = Delivery {
            state,
            move_number,
            sent_at: now,
            deliver_at,
            seq,
        };

        if self.config.duplicate_prob > 0.0
            && self.rng.gen_bool(self.config.duplicate_prob.min(1.0))
        {
            self.stats.duplicated += 1;
            self.in_flight.push_back(delivery.clone());
        }
        self.in_flight.push_back(delivery);
    }

    /// Everything due at or before `now`, in send order
    pub fn deliver(&mut self, now: Duration) -> Vec<Delivery> {
        let mut due = Vec::new();
        while self.in_flight.front().is_some_and(|d| d.deliver_at <= now) {
            if let Some(delivery) = self.in_flight.pop_front() {
                self.stats.delivered += 1;
                self.stats.max_latency = self.stats.max_latency.max(delivery.latency());
                due.push(delivery);
            }
        }
        due
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> &DeliveryStats {
        &self.stats
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }
}
