//! SentinelLink synchronization engine
//!
//! This crate is the core of the distress-messaging client: it reconciles
//! a best-effort push channel with the authoritative message store, tracks
//! read/response state per message, and drives officer status escalation
//! advisories. It handles:
//! - Connection state machine with uncapped reconnection
//! - Serialized, signal-coalescing snapshot refresh per client role
//! - Message lifecycle (send, respond, quick-acknowledge, unread counts)
//! - Officer status updates with emergency-acknowledgment protection
//!
//! The [`SentinelEngine`] facade is the entire surface exposed to the
//! presentation layer.

#![warn(missing_docs)]

pub mod connection;
pub mod lifecycle;
pub mod reconciler;

use sentinellink_channel::{LocalChannel, NotificationChannel};
use sentinellink_core::{EngineConfig, Message, Officer, OfficerStatus, Role};
use sentinellink_store::MessageStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use connection::{ConnectionState, ConnectionSupervisor};
pub use lifecycle::MessageLifecycle;
pub use reconciler::{RefreshScope, Snapshot, SyncReconciler};

use sentinellink_core::EngineError;

/// One client role instance of the synchronization engine
///
/// Construct per `(role, participant_id)`; the engine holds no ambient
/// globals. Call [`SentinelEngine::start`] to bring the push channel up;
/// all operations work pull-only before that.
pub struct SentinelEngine {
    reconciler: Arc<SyncReconciler>,
    lifecycle: MessageLifecycle,
    supervisor: Arc<ConnectionSupervisor>,
    state_rx: watch::Receiver<ConnectionState>,
    task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SentinelEngine {
    /// Wire up an engine instance
    ///
    /// `publisher` is the signal hub to announce local mutations on, when
    /// this process co-hosts it (tests, single-process deployments).
    pub fn new(
        store: Arc<dyn MessageStore>,
        channel: Arc<dyn NotificationChannel>,
        publisher: Option<LocalChannel>,
        role: Role,
        participant_id: impl Into<String>,
        config: EngineConfig,
    ) -> Self {
        let store_timeout = Duration::from_millis(config.store_timeout_ms);

        let reconciler = Arc::new(SyncReconciler::new(
            store.clone(),
            role.clone(),
            store_timeout,
        ));
        let lifecycle = MessageLifecycle::new(
            store,
            reconciler.clone(),
            publisher,
            store_timeout,
            config.max_content_len,
        );
        let (supervisor, state_rx) = ConnectionSupervisor::new(
            channel,
            reconciler.clone(),
            role,
            participant_id.into(),
            config.reconnect,
        );

        Self {
            reconciler,
            lifecycle,
            supervisor: Arc::new(supervisor),
            state_rx,
            task: std::sync::Mutex::new(None),
        }
    }

    /// Start the connection supervisor (idempotent)
    pub fn start(&self) {
        let mut task = self.task.lock().expect("task lock poisoned");
        if task.is_none() {
            *task = Some(tokio::spawn(Arc::clone(&self.supervisor).run()));
        }
    }

    /// Observable connectivity indicator for presentation
    pub fn connectivity(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Current snapshot of officers and messages for this role
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.reconciler.snapshot()
    }

    /// Pull-based refresh, used at initial mount or on demand
    pub async fn refresh(&self) {
        self.reconciler.request_refresh(RefreshScope::Full).await;
    }

    /// Send a dispatch status check
    pub async fn send(&self, officer_id: &str, content: &str) -> Result<Message, EngineError> {
        self.lifecycle.send(officer_id, content).await
    }

    /// Respond to a dispatch message
    pub async fn respond(&self, message_id: &str, content: &str) -> Result<Message, EngineError> {
        self.lifecycle.respond(message_id, content).await
    }

    /// Respond with the fixed all-clear content
    pub async fn quick_acknowledge(&self, message_id: &str) -> Result<Message, EngineError> {
        self.lifecycle.quick_acknowledge(message_id).await
    }

    /// Update an officer's status; see [`MessageLifecycle::update_officer_status`]
    pub async fn update_officer_status(
        &self,
        officer_id: &str,
        status: OfficerStatus,
        acknowledged: bool,
    ) -> Result<Officer, EngineError> {
        self.lifecycle
            .update_officer_status(officer_id, status, acknowledged)
            .await
    }

    /// Unread dispatch messages for an officer over the current snapshot
    pub fn compute_unread(&self, officer_id: &str) -> usize {
        self.lifecycle.compute_unread(officer_id)
    }

    /// Whether dispatch should be prompted to send a status check
    pub fn escalation_advisory(&self, officer: &Officer) -> bool {
        self.lifecycle.escalation_advisory(officer)
    }
}

impl Drop for SentinelEngine {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}
