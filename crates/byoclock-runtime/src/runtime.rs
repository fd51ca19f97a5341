//! Clock runtime - single-task loop over snapshots, commands and ticks

use std::time::Duration;

use byoclock_core::{ClockError, ClockResult, GameState};
use byoclock_time::{ClockEvent, ClockView, GameClock};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{execute, PauseToggle, RuntimeConfig, SessionController, Ticker};

/// Counters for one runtime
#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub snapshots: u64,
    pub beeps: u64,
    pub timeouts: u64,
    pub commands_rejected: u64,
    pub last_tick_duration: Duration,
}

/// Control messages from the embedding application
#[derive(Debug)]
enum Control {
    TogglePause(oneshot::Sender<ClockResult<()>>),
    Shutdown,
}

/// Cloneable handle to a running [`ClockRuntime`]
#[derive(Clone)]
pub struct ClockHandle {
    snapshots: mpsc::Sender<GameState>,
    commands: mpsc::Sender<Control>,
    view: watch::Receiver<ClockView>,
}

impl ClockHandle {
    /// Deliver a whole game-state snapshot
    pub async fn push_state(&self, state: GameState) -> ClockResult<()> {
        self.snapshots
            .send(state)
            .await
            .map_err(|_| ClockError::ChannelClosed("snapshots"))
    }

    /// Sender for the state-sync channel
    pub fn snapshot_sender(&self) -> mpsc::Sender<GameState> {
        self.snapshots.clone()
    }

    /// Optimistically toggle pause; resolves once the controller answered.
    /// A rejection has already been rolled back when this returns.
    pub async fn toggle_pause(&self) -> ClockResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Control::TogglePause(reply_tx))
            .await
            .map_err(|_| ClockError::ChannelClosed("commands"))?;
        reply_rx
            .await
            .map_err(|_| ClockError::ChannelClosed("command reply"))?
    }

    /// Stop the runtime (unmount or disconnect)
    pub async fn shutdown(&self) -> ClockResult<()> {
        self.commands
            .send(Control::Shutdown)
            .await
            .map_err(|_| ClockError::ChannelClosed("commands"))
    }

    /// Subscribe to computed values
    pub fn watch(&self) -> watch::Receiver<ClockView> {
        self.view.clone()
    }

    /// Latest computed values
    pub fn view(&self) -> ClockView {
        *self.view.borrow()
    }
}

/// Owns the game clock and drives it from one cooperative task.
///
/// Branch order is fixed: snapshots, then commands, then ticks, so a snapshot
/// that is ready is always applied before a tick or command that could use it.
pub struct ClockRuntime<C: SessionController> {
    clock: GameClock,
    controller: C,
    ticker: Ticker,
    snapshots: mpsc::Receiver<GameState>,
    commands: mpsc::Receiver<Control>,
    view: watch::Sender<ClockView>,
    stats: RuntimeStats,
}

impl<C: SessionController> ClockRuntime<C> {
    pub fn new(config: RuntimeConfig, controller: C) -> (Self, ClockHandle) {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(config.snapshot_buffer);
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (view_tx, view_rx) = watch::channel(ClockView::default());

        let runtime = ClockRuntime {
            clock: GameClock::new(),
            controller,
            ticker: Ticker::new(config.tick_interval),
            snapshots: snapshot_rx,
            commands: command_rx,
            view: view_tx,
            stats: RuntimeStats::default(),
        };
        let handle = ClockHandle {
            snapshots: snapshot_tx,
            commands: command_tx,
            view: view_rx,
        };
        (runtime, handle)
    }

    /// Run until shutdown or until every snapshot sender is dropped
    pub async fn run(mut self) -> RuntimeStats {
        info!(tick_interval = ?self.ticker.period(), "clock runtime started");

        loop {
            tokio::select! {
                biased;

                state = self.snapshots.recv() => match state {
                    Some(state) => self.on_snapshot(state),
                    None => {
                        info!("state-sync channel closed");
                        break;
                    }
                },

                Some(control) = self.commands.recv() => match control {
                    Control::TogglePause(reply) => {
                        let result = self.toggle_pause();
                        let _ = reply.send(result);
                    }
                    Control::Shutdown => {
                        info!("shutdown requested");
                        break;
                    }
                },

                _ = self.ticker.tick() => self.on_tick(),
            }
        }

        self.ticker.stop();
        info!(
            ticks = self.stats.ticks,
            snapshots = self.stats.snapshots,
            timeouts = self.stats.timeouts,
            "clock runtime stopped"
        );
        self.stats
    }

    fn on_snapshot(&mut self, state: GameState) {
        self.stats.snapshots += 1;
        self.clock.apply_state(state, now());
        self.sync_ticker();
        self.publish();
    }

    fn on_tick(&mut self) {
        let started = std::time::Instant::now();
        let events = self.clock.tick(now());
        self.stats.ticks += 1;

        for event in events {
            match event {
                ClockEvent::Beep { color, cue } => {
                    self.stats.beeps += 1;
                    self.controller.beep(color, &cue.name());
                }
                ClockEvent::Timeout { color } => {
                    self.stats.timeouts += 1;
                    self.controller.timeout(color);
                }
            }
        }

        self.publish();
        self.stats.last_tick_duration = started.elapsed();
    }

    fn toggle_pause(&mut self) -> ClockResult<()> {
        let mut toggle = PauseToggle::new();
        let result = execute(&mut toggle, &mut self.clock, &mut self.controller, now());
        if result.is_err() {
            self.stats.commands_rejected += 1;
        }
        self.sync_ticker();
        self.publish();
        result
    }

    /// Ticker runs exactly while a clock runs
    fn sync_ticker(&mut self) {
        let running = self.clock.is_running();
        if running != self.ticker.is_running() {
            debug!(running, "ticker toggled");
        }
        self.ticker.set_running(running);
    }

    fn publish(&self) {
        // No subscribers is fine
        let _ = self.view.send(self.clock.view());
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }
}

/// Runtime time source; follows tokio's clock so paused-time tests work
#[inline]
fn now() -> std::time::Instant {
    Instant::now().into_std()
}
