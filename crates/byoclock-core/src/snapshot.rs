//! Authoritative snapshots delivered by the state-sync channel

use std::time::Duration;

use crate::{clamp_secs, Color, TimeBudget};

/// Server-confirmed time usage for one player.
///
/// Replaced wholesale whenever a new game state arrives; the client never
/// mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlayerSnapshot {
    /// Main time used, confirmed at move boundaries
    pub main_time_used: Duration,
    /// Byoyomi periods already consumed
    pub periods_used: u32,
    /// Byoyomi time already spent on the node in progress.
    /// Reset to zero when a move completes on that node.
    pub current_node_time_used: Duration,
}

impl PlayerSnapshot {
    pub fn new(main_time_used: Duration, periods_used: u32, current_node_time_used: Duration) -> Self {
        PlayerSnapshot {
            main_time_used,
            periods_used,
            current_node_time_used,
        }
    }

    /// Build from raw wire figures; negative values clamp to zero
    pub fn from_secs_f64(main_used_secs: f64, periods_used: i64, node_used_secs: f64) -> Self {
        PlayerSnapshot {
            main_time_used: clamp_secs(main_used_secs),
            periods_used: periods_used.clamp(0, u32::MAX as i64) as u32,
            current_node_time_used: clamp_secs(node_used_secs),
        }
    }
}

/// Whole game-state snapshot as delivered by the sync channel
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GameState {
    /// Time settings for the game
    pub budget: TimeBudget,
    /// Game-wide pause flag
    pub paused: bool,
    /// Side to move; `None` when nobody's clock may run
    pub active: Option<Color>,
    /// Per-player usage, indexed by [`Color::index`]
    pub players: [PlayerSnapshot; 2],
}

impl GameState {
    pub fn new(budget: TimeBudget) -> Self {
        GameState {
            budget,
            paused: false,
            active: None,
            players: [PlayerSnapshot::default(); 2],
        }
    }

    pub fn with_active(mut self, active: Option<Color>) -> Self {
        self.active = active;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn with_player(mut self, color: Color, snapshot: PlayerSnapshot) -> Self {
        self.players[color.index()] = snapshot;
        self
    }

    #[inline]
    pub fn player(&self, color: Color) -> &PlayerSnapshot {
        &self.players[color.index()]
    }

    #[inline]
    pub fn is_active(&self, color: Color) -> bool {
        self.active == Some(color)
    }

    /// Whether `color`'s clock may legitimately run
    #[inline]
    pub fn is_running(&self, color: Color) -> bool {
        self.is_active(color) && !self.paused && !self.budget.is_disabled()
    }
}
