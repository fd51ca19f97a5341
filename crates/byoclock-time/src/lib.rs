//! byoclock Time Engine - client-side byoyomi clock reconciliation
//!
//! This crate implements the engine:
//! - Elapsed tracking since the last authoritative reference point
//! - Reconciliation of snapshots with local elapsed time
//! - Countdown cue edge detection
//! - Timeout edge detection
//! - Per-game orchestration of the tick pipeline

pub mod engine;
pub mod reconcile;
pub mod sound;
pub mod timeout;
pub mod tracker;

pub use engine::*;
pub use reconcile::*;
pub use sound::*;
pub use timeout::*;
pub use tracker::*;
