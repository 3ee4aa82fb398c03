//! In-process notification channel
//!
//! Broadcast-based fan-out for tests and single-process deployments.
//! Each subscriber gets a forwarder task that filters the shared signal
//! stream down to its role; lagged subscribers simply drop signals,
//! which the reconciler tolerates by design.

use async_trait::async_trait;
use sentinellink_core::{ChannelConfig, Role};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::signal::{ChannelEvent, Signal};
use crate::{ChannelError, NotificationChannel, Subscription};

#[derive(Debug, Clone)]
enum Fanout {
    Signal(Signal),
    CloseAll,
}

/// In-process signal channel
#[derive(Clone)]
pub struct LocalChannel {
    tx: broadcast::Sender<Fanout>,
    buffer: usize,
}

impl LocalChannel {
    /// Create a channel with the given per-subscriber buffer depth
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self { tx, buffer }
    }

    /// Create a channel sized by the deployment configuration
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.signal_buffer)
    }

    /// Publish a signal to all subscribers (best-effort)
    pub fn publish(&self, signal: Signal) {
        // Ignore errors if no receivers
        let _ = self.tx.send(Fanout::Signal(signal));
    }

    /// Close every live subscription, as a transport loss would
    pub fn close_all(&self) {
        let _ = self.tx.send(Fanout::CloseAll);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl NotificationChannel for LocalChannel {
    async fn subscribe(
        &self,
        role: Role,
        participant_id: &str,
    ) -> Result<Subscription, ChannelError> {
        let mut fan_rx = self.tx.subscribe();
        let (event_tx, event_rx) = mpsc::channel(self.buffer.max(1));

        debug!(?role, participant_id = %participant_id, "Local channel subscription opened");

        tokio::spawn(async move {
            if event_tx.send(ChannelEvent::Opened).await.is_err() {
                return;
            }

            loop {
                match fan_rx.recv().await {
                    Ok(Fanout::Signal(signal)) => {
                        if !signal.is_relevant_to(&role) {
                            continue;
                        }
                        if event_tx
                            .send(ChannelEvent::Signal(signal.category))
                            .await
                            .is_err()
                        {
                            // Subscriber went away
                            break;
                        }
                    }
                    Ok(Fanout::CloseAll) => {
                        let _ = event_tx.send(ChannelEvent::Closed).await;
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // At-most-once delivery: dropped signals are legal
                        warn!(skipped, "Subscriber lagged, signals dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        let _ = event_tx.send(ChannelEvent::Closed).await;
                        break;
                    }
                }
            }
        });

        Ok(Subscription::new(event_rx))
    }
}
