//! byoclock Core - Fundamental types for byoyomi game clocks
//!
//! This crate defines the data model shared by the engine and runtime:
//! - Player colors
//! - Time budgets (static per-game settings)
//! - Authoritative snapshots and the game-state envelope
//! - Reconciled (predicted) time and its display helpers

pub mod budget;
pub mod color;
pub mod error;
pub mod snapshot;
pub mod time;

pub use budget::*;
pub use color::*;
pub use error::*;
pub use snapshot::*;
pub use time::*;
