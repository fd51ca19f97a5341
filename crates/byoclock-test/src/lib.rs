//! byoclock Test Harness - end-to-end clock simulation
//!
//! This crate provides:
//! - A reference authority that charges time on move completion
//! - Lossy, late snapshot delivery with seeded randomness
//! - A scenario runner that drives the client clock on virtual time and
//!   checks it against the authority

pub mod authority;
pub mod delivery;
pub mod scenario;

pub use authority::*;
pub use delivery::*;
pub use scenario::*;
