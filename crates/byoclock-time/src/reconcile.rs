//! Time reconciliation: snapshot + local elapsed -> live countdown
//!
//! Elapsed time since the last snapshot is partitioned deterministically:
//! the part that fits into the main time still remaining at the snapshot is
//! charged to main time, the excess is charged to byoyomi node time. An
//! interval is never charged to both.

use std::time::Duration;

use byoclock_core::{PlayerSnapshot, ReconciledTime, TimeBudget};

/// Derive remaining main time, byoyomi and periods for one player.
///
/// When the clock is not running (`!active || paused`) the elapsed duration
/// is ignored and only confirmed values are shown, so a stale ticker can
/// never advance a stopped clock.
pub fn reconcile(
    budget: &TimeBudget,
    snapshot: &PlayerSnapshot,
    elapsed: Duration,
    active: bool,
    paused: bool,
) -> ReconciledTime {
    let elapsed = if active && !paused {
        elapsed
    } else {
        Duration::ZERO
    };

    let remaining_main = budget.main_time.saturating_sub(snapshot.main_time_used);
    let overflow = elapsed.saturating_sub(remaining_main);
    let effective_main_used = snapshot
        .main_time_used
        .saturating_add(elapsed.min(remaining_main));
    let main_time_left = budget.main_time.saturating_sub(effective_main_used);

    if !main_time_left.is_zero() {
        return ReconciledTime {
            main_time_left,
            byoyomi_left: budget.byo_length,
            periods_left: budget.byo_periods.saturating_sub(snapshot.periods_used),
            periods_used: snapshot.periods_used,
            in_byoyomi: false,
        };
    }

    let node_time_used = snapshot.current_node_time_used.saturating_add(overflow);
    let (periods_used, node_time_used) = roll_periods(
        node_time_used,
        budget.byo_length,
        snapshot.periods_used,
        budget.byo_periods,
    );

    if periods_used >= budget.byo_periods {
        // No period left to absorb whatever remains
        return ReconciledTime {
            main_time_left: Duration::ZERO,
            byoyomi_left: Duration::ZERO,
            periods_left: 0,
            periods_used,
            in_byoyomi: true,
        };
    }

    ReconciledTime {
        main_time_left: Duration::ZERO,
        byoyomi_left: budget.byo_length.saturating_sub(node_time_used),
        periods_left: budget.byo_periods - periods_used,
        periods_used,
        in_byoyomi: true,
    }
}

/// Deduct every fully overrun period from `node_time_used`.
///
/// Equivalent to repeatedly subtracting `length` while the node time exceeds
/// one period and periods remain, computed in closed form on nanoseconds so
/// large period counts or zero-length periods cost nothing.
pub fn roll_periods(
    node_time_used: Duration,
    length: Duration,
    periods_used: u32,
    byo_periods: u32,
) -> (u32, Duration) {
    if periods_used >= byo_periods || node_time_used <= length {
        return (periods_used, node_time_used);
    }

    let available = u128::from(byo_periods - periods_used);
    let node = node_time_used.as_nanos();
    let len = length.as_nanos();

    let needed = if len == 0 {
        available
    } else {
        // smallest k with node - k * len <= len
        (node + len - 1) / len - 1
    };
    let rolls = needed.min(available);
    let remainder = node.saturating_sub(rolls * len);

    (
        periods_used + rolls as u32,
        Duration::new(
            (remainder / 1_000_000_000) as u64,
            (remainder % 1_000_000_000) as u32,
        ),
    )
}
