//! Domain types for officer distress messaging
//!
//! This module defines the entities shared by the store, channel, and
//! engine crates: officers with their safety status, and the messages
//! exchanged between dispatch and the field.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Maximum message content length in bytes (after trimming)
pub const MAX_CONTENT_LEN: usize = 2048;

/// Fixed content used by the quick-acknowledge path
pub const ALL_CLEAR_CONTENT: &str = "I'm OK - All clear";

/// Officer safety status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfficerStatus {
    /// Vitals within normal range
    Normal,
    /// Vitals elevated, dispatch attention warranted
    ElevatedVitals,
    /// Emergency declared
    Emergency,
}

impl OfficerStatus {
    /// Check whether this status warrants a dispatch status check
    pub fn is_escalated(&self) -> bool {
        matches!(self, OfficerStatus::ElevatedVitals | OfficerStatus::Emergency)
    }
}

/// Field officer roster entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Officer {
    /// Officer identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Current safety status
    pub status: OfficerStatus,
    /// Last seen timestamp in nanoseconds since epoch
    pub last_seen_ns: u64,
}

impl Officer {
    /// Check if officer is considered stale (> 30s since last seen)
    pub fn is_stale(&self, current_time_ns: u64) -> bool {
        const STALE_THRESHOLD_NS: u64 = 30_000_000_000; // 30 seconds

        if current_time_ns < self.last_seen_ns {
            return false; // Clock skew - don't mark as stale
        }

        (current_time_ns - self.last_seen_ns) > STALE_THRESHOLD_NS
    }
}

/// A single message in a dispatch/officer conversation
///
/// Content is immutable after creation; only the `read` flag changes,
/// false to true, exactly once. Messages are never deleted (audit log
/// for distress communication).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Message identifier
    pub id: String,
    /// Owning officer
    pub officer_id: String,
    /// True when dispatch originated the message
    pub from_dispatch: bool,
    /// Message text (bounded, non-blank)
    pub content: String,
    /// Creation timestamp in nanoseconds since epoch
    pub timestamp_ns: u64,
    /// Read flag; monotonic false -> true
    pub read: bool,
    /// Message this one answers (officer responses only)
    pub in_response_to: Option<String>,
}

impl Message {
    /// Check whether this is an unread dispatch message
    pub fn is_unread_check(&self) -> bool {
        self.from_dispatch && !self.read
    }

    /// Check whether this is an officer response to a dispatch message
    pub fn is_response(&self) -> bool {
        !self.from_dispatch && self.in_response_to.is_some()
    }
}

/// Client role a sync engine instance acts as
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    /// Dispatch console: sees all officers and all messages
    Dispatch,
    /// Field officer: sees only their own conversation
    Officer(String),
}

impl Role {
    /// Officer id when acting as an officer, otherwise `None`
    pub fn officer_id(&self) -> Option<&str> {
        match self {
            Role::Dispatch => None,
            Role::Officer(id) => Some(id.as_str()),
        }
    }
}

/// Validate message content against the default domain bounds
///
/// Returns the trimmed content on success.
pub fn validate_content(content: &str) -> Option<&str> {
    validate_content_bounded(content, MAX_CONTENT_LEN)
}

/// Validate message content against a caller-supplied length cap
///
/// Deployments tighten the cap through configuration; the engine passes
/// its effective limit here.
pub fn validate_content_bounded(content: &str, max_len: usize) -> Option<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.len() > max_len {
        return None;
    }
    Some(trimmed)
}
