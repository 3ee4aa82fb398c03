//! Core functionality for the SentinelLink distress-messaging engine.
//!
//! This crate provides the domain types, error taxonomy, configuration,
//! and logging bootstrap shared across the SentinelLink workspace. It
//! performs no I/O of its own.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{ChannelConfig, Config, EngineConfig, ReconnectPolicy};
pub use error::{EngineError, Result};
pub use types::{
    validate_content, validate_content_bounded, Message, Officer, OfficerStatus, Role,
    ALL_CLEAR_CONTENT, MAX_CONTENT_LEN,
};

/// Current timestamp in nanoseconds since the Unix epoch
///
/// Returns 0 if system time is before the epoch (should never happen in practice)
pub fn current_timestamp_ns() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
