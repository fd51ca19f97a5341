//! Error types for byoclock
//!
//! The reconciliation engine itself never fails; these errors only surface at
//! the runtime boundary.

use thiserror::Error;

/// byoclock errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("Command rejected: {0}")]
    CommandRejected(String),
}

/// Result type for byoclock operations
pub type ClockResult<T> = Result<T, ClockError>;
