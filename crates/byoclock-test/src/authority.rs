//! Reference authority - server-side byoyomi accounting
//!
//! Keeps the ground truth the client predicts. Time is charged when a move
//! completes; in between, `state_at` reports the figures the server would
//! confirm at that instant (periodic push).

use std::time::Duration;

use byoclock_core::{Color, GameState, PlayerSnapshot, TimeBudget};

/// Confirmed usage for one player between moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub main_used: Duration,
    pub periods_used: u32,
}

/// Outcome of charging `spent` to an account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charge {
    pub account: Account,
    /// Byoyomi time on the node in progress
    pub node_used: Duration,
    pub exhausted: bool,
}

/// Charge `spent` against `account` one period at a time
pub fn charge(budget: &TimeBudget, account: Account, spent: Duration) -> Charge {
    let main_left = budget.main_time.saturating_sub(account.main_used);
    let from_main = spent.min(main_left);
    let mut main_used = account.main_used + from_main;
    let mut node = spent - from_main;
    let mut periods_used = account.periods_used;

    if main_used < budget.main_time {
        return Charge {
            account: Account { main_used, periods_used },
            node_used: Duration::ZERO,
            exhausted: false,
        };
    }
    main_used = main_used.max(budget.main_time);

    while node > budget.byo_length && periods_used < budget.byo_periods {
        node -= budget.byo_length;
        periods_used += 1;
    }

    Charge {
        account: Account { main_used, periods_used },
        node_used: node,
        exhausted: periods_used >= budget.byo_periods,
    }
}

/// Server-side game clock with virtual time
#[derive(Clone, Debug)]
pub struct Authority {
    budget: TimeBudget,
    accounts: [Account; 2],
    to_move: Color,
    move_started: Duration,
    moves: u32,
    /// Player who lost on time
    flagged: Option<Color>,
}

impl Authority {
    /// Black to move at virtual time zero
    pub fn new(budget: TimeBudget) -> Self {
        Authority {
            budget,
            accounts: [Account::default(); 2],
            to_move: Color::Black,
            move_started: Duration::ZERO,
            moves: 0,
            flagged: None,
        }
    }

    pub fn budget(&self) -> &TimeBudget {
        &self.budget
    }

    pub fn to_move(&self) -> Option<Color> {
        self.flagged.is_none().then_some(self.to_move)
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn flagged(&self) -> Option<Color> {
        self.flagged
    }

    pub fn account(&self, color: Color) -> Account {
        self.accounts[color.index()]
    }

    fn pending(&self, now: Duration) -> Charge {
        charge(
            &self.budget,
            self.accounts[self.to_move.index()],
            now.saturating_sub(self.move_started),
        )
    }

    /// Whether the player to move has run out at `now`
    pub fn is_exhausted_at(&self, now: Duration) -> bool {
        self.flagged.is_some() || self.pending(now).exhausted
    }

    /// Figures the server confirms at `now`
    pub fn state_at(&self, now: Duration) -> GameState {
        let mut state = GameState::new(self.budget).with_active(self.to_move());

        for color in Color::ALL {
            let account = self.accounts[color.index()];
            let snapshot = if self.to_move() == Some(color) {
                let pending = self.pending(now);
                PlayerSnapshot::new(
                    pending.account.main_used,
                    pending.account.periods_used,
                    pending.node_used,
                )
            } else {
                PlayerSnapshot::new(account.main_used, account.periods_used, Duration::ZERO)
            };
            state = state.with_player(color, snapshot);
        }
        state
    }

    /// The player to move completes a move at `now`.
    /// Returns false if they had already run out (the move is refused).
    pub fn complete_move(&mut self, now: Duration) -> bool {
        if self.flagged.is_some() {
            return false;
        }
        let pending = self.pending(now);
        if pending.exhausted {
            self.accounts[self.to_move.index()] = pending.account;
            self.flagged = Some(self.to_move);
            return false;
        }

        // Node time is forgiven on completion; only consumed periods stick
        self.accounts[self.to_move.index()] = pending.account;
        self.to_move = self.to_move.opponent();
        self.move_started = now;
        self.moves += 1;
        true
    }

    /// Client asks to flag `color`. Accepted only if that player is to move
    /// and has really run out.
    pub fn claim_timeout(&mut self, color: Color, now: Duration) -> bool {
        if self.flagged == Some(color) {
            return true;
        }
        if self.flagged.is_some() || self.to_move != color || !self.pending(now).exhausted {
            return false;
        }
        self.accounts[color.index()] = self.pending(now).account;
        self.flagged = Some(color);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_charge_main_then_byoyomi() {
        let budget = TimeBudget::new(secs(60), secs(30), 3);

        let c = charge(&budget, Account::default(), secs(40));
        assert_eq!(c.account.main_used, secs(40));
        assert!(!c.exhausted);

        let c = charge(&budget, Account { main_used: secs(55), periods_used: 0 }, secs(12));
        assert_eq!(c.account.main_used, secs(60));
        assert_eq!(c.node_used, secs(7));
        assert_eq!(c.account.periods_used, 0);

        let c = charge(&budget, Account { main_used: secs(60), periods_used: 0 }, secs(65));
        assert_eq!(c.account.periods_used, 2);
        assert_eq!(c.node_used, secs(5));
        assert!(!c.exhausted);

        let c = charge(&budget, Account { main_used: secs(60), periods_used: 2 }, secs(31));
        assert!(c.exhausted);
    }

    #[test]
    fn test_moves_alternate_and_forgive_node_time() {
        let mut authority = Authority::new(TimeBudget::new(Duration::ZERO, secs(30), 3));

        assert!(authority.complete_move(secs(25)));
        assert_eq!(authority.to_move(), Some(Color::White));
        assert_eq!(authority.account(Color::Black).periods_used, 0);

        // White overruns one period
        assert!(authority.complete_move(secs(25 + 45)));
        assert_eq!(authority.account(Color::White).periods_used, 1);
        assert_eq!(authority.moves(), 2);
    }

    #[test]
    fn test_state_at_reports_node_time() {
        let authority = Authority::new(TimeBudget::new(secs(10), secs(30), 2));

        let state = authority.state_at(secs(25));
        let black = state.player(Color::Black);
        assert_eq!(black.main_time_used, secs(10));
        assert_eq!(black.current_node_time_used, secs(15));
        assert_eq!(state.active, Some(Color::Black));
    }

    #[test]
    fn test_claims() {
        let mut authority = Authority::new(TimeBudget::new(Duration::ZERO, secs(10), 1));

        assert!(!authority.claim_timeout(Color::Black, secs(5)));
        assert!(!authority.claim_timeout(Color::White, secs(15)));
        assert!(authority.claim_timeout(Color::Black, secs(15)));
        assert_eq!(authority.flagged(), Some(Color::Black));
        assert_eq!(authority.to_move(), None);
        assert!(!authority.complete_move(secs(16)));
    }
}
