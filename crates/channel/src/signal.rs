//! Notification signal contract
//!
//! Signals are payload-less: they name a category of change and tell the
//! reconciler to re-pull that category from the store. Delivery is
//! at-most-once, best-effort; the absence of a signal is never evidence
//! of no change.

use sentinellink_core::Role;
use serde::{Deserialize, Serialize};

/// Category of change a signal announces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    /// Dispatch sent a message to an officer
    MessageReceived,
    /// An officer responded to a status check
    OfficerResponse,
    /// An officer's safety status changed
    StatusUpdate,
}

/// A routed signal as published by the store-side of the system
///
/// `officer_id` is routing information only; subscribers receive just the
/// category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signal {
    /// Change category
    pub category: SignalCategory,
    /// Officer the change concerns, when scoped
    pub officer_id: Option<String>,
}

impl Signal {
    /// Dispatch sent a status check to `officer_id`
    pub fn message_received(officer_id: impl Into<String>) -> Self {
        Self {
            category: SignalCategory::MessageReceived,
            officer_id: Some(officer_id.into()),
        }
    }

    /// Officer `officer_id` responded
    pub fn officer_response(officer_id: impl Into<String>) -> Self {
        Self {
            category: SignalCategory::OfficerResponse,
            officer_id: Some(officer_id.into()),
        }
    }

    /// Officer `officer_id` changed status
    pub fn status_update(officer_id: impl Into<String>) -> Self {
        Self {
            category: SignalCategory::StatusUpdate,
            officer_id: Some(officer_id.into()),
        }
    }

    /// Check whether this signal should be delivered to a subscriber role
    ///
    /// Dispatch hears officer responses and status changes across the
    /// roster; an officer hears only status checks addressed to them.
    pub fn is_relevant_to(&self, role: &Role) -> bool {
        match role {
            Role::Dispatch => matches!(
                self.category,
                SignalCategory::OfficerResponse | SignalCategory::StatusUpdate
            ),
            Role::Officer(id) => {
                self.category == SignalCategory::MessageReceived
                    && self.officer_id.as_deref() == Some(id.as_str())
            }
        }
    }
}

/// Channel lifecycle and signal events observed by a subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Channel established
    Opened,
    /// Channel closed by the remote side
    Closed,
    /// Channel failed
    Errored(String),
    /// A change signal arrived
    Signal(SignalCategory),
}

/// Wire message format for the WebSocket binding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// Connection acknowledgment
    Ack {
        /// Human-readable status message
        message: String,
    },
    /// Client keepalive
    Ping,
    /// Keepalive reply
    Pong,
    /// Dispatch message landed
    MessageReceived,
    /// Officer response landed
    OfficerResponse,
    /// Officer status changed
    StatusUpdate,
}

impl From<SignalCategory> for WireMessage {
    fn from(category: SignalCategory) -> Self {
        match category {
            SignalCategory::MessageReceived => WireMessage::MessageReceived,
            SignalCategory::OfficerResponse => WireMessage::OfficerResponse,
            SignalCategory::StatusUpdate => WireMessage::StatusUpdate,
        }
    }
}

impl WireMessage {
    /// Signal category carried by this wire message, if any
    pub fn category(&self) -> Option<SignalCategory> {
        match self {
            WireMessage::MessageReceived => Some(SignalCategory::MessageReceived),
            WireMessage::OfficerResponse => Some(SignalCategory::OfficerResponse),
            WireMessage::StatusUpdate => Some(SignalCategory::StatusUpdate),
            _ => None,
        }
    }
}
