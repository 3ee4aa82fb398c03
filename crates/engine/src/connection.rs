//! Connection state machine and reconnect supervision
//!
//! The supervisor exclusively owns the notification channel handle. State
//! moves only on channel lifecycle events, through an explicit transition
//! validity function, and every transition is published on a watch channel
//! for the presentation layer's connectivity indicator.
//!
//! While the channel is anything other than `Connected`, push signals are
//! not trusted; entering `Connected` triggers exactly one immediate full
//! refresh to close the gap accumulated while offline. Reconnection never
//! gives up: there is no retry cap in a distress-messaging client.

use sentinellink_channel::{ChannelEvent, NotificationChannel};
use sentinellink_core::{ReconnectPolicy, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::reconciler::{RefreshScope, SyncReconciler};

/// Channel connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No channel; pull-only operation
    Disconnected,
    /// Subscription attempt in progress
    Connecting,
    /// Live channel; push signals trusted
    Connected,
}

impl ConnectionState {
    /// Check if transition to new state is valid
    pub fn can_transition_to(&self, new_state: ConnectionState) -> bool {
        match (self, new_state) {
            // Reconnect attempt
            (ConnectionState::Disconnected, ConnectionState::Connecting) => true,
            // Subscription established
            (ConnectionState::Connecting, ConnectionState::Connected) => true,
            // Subscription attempt failed
            (ConnectionState::Connecting, ConnectionState::Disconnected) => true,
            // Channel error/close
            (ConnectionState::Connected, ConnectionState::Disconnected) => true,
            _ => false,
        }
    }

    /// Check whether push signals are trusted in this state
    pub fn trusts_signals(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Owns the channel handle and drives the connection state machine
pub struct ConnectionSupervisor {
    channel: Arc<dyn NotificationChannel>,
    reconciler: Arc<SyncReconciler>,
    role: Role,
    participant_id: String,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionSupervisor {
    /// Create a supervisor; returns it with the connectivity indicator
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        reconciler: Arc<SyncReconciler>,
        role: Role,
        participant_id: String,
        policy: ReconnectPolicy,
    ) -> (Self, watch::Receiver<ConnectionState>) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let supervisor = Self {
            channel,
            reconciler,
            role,
            participant_id,
            policy,
            state_tx,
        };

        (supervisor, state_rx)
    }

    /// Current connectivity state
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn transition(&self, to: ConnectionState) {
        let from = self.state();
        if !from.can_transition_to(to) {
            warn!(?from, ?to, "Ignoring invalid connection transition");
            return;
        }

        info!(
            participant_id = %self.participant_id,
            ?from,
            ?to,
            "Connection state transition"
        );
        let _ = self.state_tx.send(to);
    }

    /// Run the subscribe/consume/reconnect loop until the task is dropped
    ///
    /// A single loop holds at most one pending reconnect timer; scheduling
    /// the next attempt implicitly supersedes any earlier one.
    pub async fn run(self: Arc<Self>) {
        let mut attempt: u32 = 0;

        loop {
            if attempt > 0 {
                let delay = self.policy.delay_ms(attempt);
                debug!(
                    participant_id = %self.participant_id,
                    attempt,
                    delay_ms = delay,
                    "Reconnect scheduled"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            self.transition(ConnectionState::Connecting);

            let subscription = self
                .channel
                .subscribe(self.role.clone(), &self.participant_id)
                .await;

            match subscription {
                Ok(mut subscription) => {
                    let mut connected = false;

                    loop {
                        match subscription.recv().await {
                            Some(ChannelEvent::Opened) => {
                                self.transition(ConnectionState::Connected);
                                connected = true;
                                attempt = 0;
                                // One full refresh closes any gap accumulated
                                // while offline, regardless of missed signals.
                                self.reconciler.request_refresh(RefreshScope::Full).await;
                            }
                            Some(ChannelEvent::Signal(category)) => {
                                if !self.state().trusts_signals() {
                                    debug!(?category, "Dropping signal outside connected state");
                                    continue;
                                }
                                self.reconciler
                                    .request_refresh(RefreshScope::from(category))
                                    .await;
                            }
                            Some(ChannelEvent::Errored(reason)) => {
                                warn!(
                                    participant_id = %self.participant_id,
                                    reason = %reason,
                                    "Channel errored"
                                );
                                break;
                            }
                            Some(ChannelEvent::Closed) | None => {
                                break;
                            }
                        }
                    }

                    if !connected {
                        debug!(
                            participant_id = %self.participant_id,
                            "Subscription ended before opening"
                        );
                    }
                    self.transition(ConnectionState::Disconnected);
                }
                Err(e) => {
                    warn!(
                        participant_id = %self.participant_id,
                        error = %e,
                        "Channel subscription failed"
                    );
                    self.transition(ConnectionState::Disconnected);
                }
            }

            attempt = attempt.saturating_add(1);
        }
    }
}
