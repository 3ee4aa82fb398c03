//! Engine error taxonomy
//!
//! No error in this domain is fatal to the process: a distress-messaging
//! client keeps attempting to reach a usable state indefinitely. Transient
//! failures degrade to a disconnected or stale view instead of crashing.

use thiserror::Error;

/// Error type shared across the SentinelLink engine surface
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input, shown inline to the operator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Stale reference; a refresh reconciles the staleness
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate response attempt; first response wins
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store or channel call failed or timed out; retried via the
    /// standard refresh/reconnect path
    #[error("Transient I/O error: {0}")]
    TransientIo(String),
}

impl EngineError {
    /// Every engine error is recoverable in this domain
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Check whether the error should trigger a reconciling refresh
    pub fn triggers_refresh(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}

/// Convenience result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
