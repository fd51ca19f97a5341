//! byoclock Runtime - cooperative shell around the clock engine
//!
//! One task owns the game clock and reacts to three sources:
//! 1. Whole game-state snapshots from the state-sync channel
//! 2. Control commands (optimistic pause toggle, shutdown)
//! 3. The ticker, which only runs while a clock runs
//!
//! Cues and timeout requests go to a [`SessionController`]; computed values
//! are published on a watch channel for presentation.

pub mod command;
pub mod config;
pub mod controller;
pub mod logging;
pub mod runtime;
pub mod ticker;

pub use command::*;
pub use config::*;
pub use controller::*;
pub use logging::*;
pub use runtime::*;
pub use ticker::*;
