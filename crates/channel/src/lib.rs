//! Notification channel for SentinelLink
//!
//! This crate carries the push side of the sync engine:
//! - Payload-less signal categories and channel lifecycle events
//! - The `NotificationChannel` subscription contract consumed by the engine
//! - An in-process broadcast implementation for tests and co-located roles
//! - A WebSocket fan-out server for remote clients
//!
//! Delivery is at-most-once and best-effort. Consumers must never treat the
//! absence of a signal as evidence of no change; the engine's connect-time
//! full refresh closes any gap.

#![warn(missing_docs)]

pub mod local;
pub mod signal;
pub mod ws;

use async_trait::async_trait;
use sentinellink_core::Role;
use thiserror::Error;
use tokio::sync::mpsc;

pub use local::LocalChannel;
pub use signal::{ChannelEvent, Signal, SignalCategory, WireMessage};
pub use ws::SignalServer;

/// Channel operation errors
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connection establishment or transport failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Wire format failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A live channel subscription
///
/// Yields lifecycle events and signals until the channel closes; `None`
/// means the subscription is finished and must be re-established.
pub struct Subscription {
    rx: mpsc::Receiver<ChannelEvent>,
}

impl Subscription {
    /// Wrap a raw event receiver
    pub fn new(rx: mpsc::Receiver<ChannelEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next channel event
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}

/// Subscription contract consumed by the connection supervisor
///
/// A subscription is identified by `(role, participant_id)`. The channel
/// implementation filters signals to the subscriber's role before delivery.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Open a subscription for one client role instance
    async fn subscribe(
        &self,
        role: Role,
        participant_id: &str,
    ) -> Result<Subscription, ChannelError>;
}
