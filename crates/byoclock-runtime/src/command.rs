//! Optimistic local commands with compensating actions
//!
//! A command is applied to the clock immediately, then confirmed with the
//! session controller. If confirmation fails the compensating action restores
//! the previous local state; the next snapshot remains authoritative either way.

use std::time::Instant;

use byoclock_core::ClockResult;
use byoclock_time::GameClock;
use tracing::{debug, warn};

use crate::SessionController;

/// An optimistic change to the local clock
pub trait ClockCommand {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Apply the change locally
    fn apply(&mut self, clock: &mut GameClock, now: Instant);

    /// Ask the authority to accept the change
    fn confirm(&mut self, controller: &mut dyn SessionController) -> ClockResult<()>;

    /// Undo `apply`
    fn compensate(&mut self, clock: &mut GameClock, now: Instant);
}

/// Apply `command`, confirm it, and compensate on rejection
pub fn execute(
    command: &mut dyn ClockCommand,
    clock: &mut GameClock,
    controller: &mut dyn SessionController,
    now: Instant,
) -> ClockResult<()> {
    command.apply(clock, now);

    match command.confirm(controller) {
        Ok(()) => {
            debug!(command = command.name(), "command confirmed");
            Ok(())
        }
        Err(e) => {
            warn!(command = command.name(), error = %e, "command rejected, rolling back");
            command.compensate(clock, now);
            Err(e)
        }
    }
}

/// Flip the pause flag. Pausing stops the ticker and every latch at once.
#[derive(Clone, Copy, Debug)]
pub struct PauseToggle {
    previous: Option<bool>,
}

impl PauseToggle {
    pub fn new() -> Self {
        PauseToggle { previous: None }
    }

    /// Pause state requested by this toggle, once applied
    pub fn target(&self) -> Option<bool> {
        self.previous.map(|p| !p)
    }
}

impl Default for PauseToggle {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockCommand for PauseToggle {
    fn name(&self) -> &'static str {
        "pause_toggle"
    }

    fn apply(&mut self, clock: &mut GameClock, now: Instant) {
        let previous = clock.state().paused;
        self.previous = Some(previous);
        clock.set_paused(!previous, now);
    }

    fn confirm(&mut self, controller: &mut dyn SessionController) -> ClockResult<()> {
        match self.target() {
            Some(paused) => controller.request_pause(paused),
            None => Ok(()),
        }
    }

    fn compensate(&mut self, clock: &mut GameClock, now: Instant) {
        if let Some(previous) = self.previous.take() {
            clock.set_paused(previous, now);
        }
    }
}
