//! Message lifecycle engine
//!
//! Owns message state transitions (sent -> read), response composition
//! rules, and officer status escalation advisories. Every mutation goes
//! through the authoritative store; there is no optimistic local echo.
//! After a successful mutation the engine publishes the matching change
//! signal and refreshes its own snapshot, trading latency for consistency.

use sentinellink_channel::{LocalChannel, Signal};
use sentinellink_core::{
    current_timestamp_ns, validate_content_bounded, EngineError, Message, Officer, OfficerStatus,
    ALL_CLEAR_CONTENT, MAX_CONTENT_LEN,
};
use sentinellink_store::{MessageStore, StoreError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::reconciler::{RefreshScope, SyncReconciler};

/// Message lifecycle operations for one role instance
pub struct MessageLifecycle {
    store: Arc<dyn MessageStore>,
    reconciler: Arc<SyncReconciler>,
    /// Signal hub to announce mutations on, when this instance co-hosts it
    publisher: Option<LocalChannel>,
    store_timeout: Duration,
    /// Effective content length cap; configuration may tighten the default
    max_content_len: usize,
}

impl MessageLifecycle {
    /// Create a lifecycle engine over the store and reconciler
    pub fn new(
        store: Arc<dyn MessageStore>,
        reconciler: Arc<SyncReconciler>,
        publisher: Option<LocalChannel>,
        store_timeout: Duration,
        max_content_len: Option<usize>,
    ) -> Self {
        Self {
            store,
            reconciler,
            publisher,
            store_timeout,
            max_content_len: max_content_len.unwrap_or(MAX_CONTENT_LEN),
        }
    }

    /// Bound a store call; timeout degrades to a transient error
    async fn bounded<T, F>(&self, call: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::NotFound(what))) => Err(EngineError::NotFound(what)),
            Ok(Err(StoreError::Io(reason))) => Err(EngineError::TransientIo(reason)),
            Err(_) => Err(EngineError::TransientIo("store call timed out".to_string())),
        }
    }

    fn publish(&self, signal: Signal) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(signal);
        }
    }

    /// Send a dispatch-originated status check to an officer
    pub async fn send(&self, officer_id: &str, content: &str) -> Result<Message, EngineError> {
        let content = validate_content_bounded(content, self.max_content_len)
            .ok_or_else(|| EngineError::Validation("message content is empty or too long".to_string()))?;

        let officer = self.bounded(self.store.get_officer(officer_id)).await?;
        if officer.is_none() {
            return Err(EngineError::Validation(format!(
                "unknown officer {officer_id}"
            )));
        }

        let message = self
            .bounded(self.store.create_message(officer_id, content, true, None))
            .await?;

        info!(
            message_id = %message.id,
            officer_id = %officer_id,
            "Status check sent"
        );

        self.publish(Signal::message_received(officer_id));
        self.reconciler.request_refresh(RefreshScope::Messages).await;

        Ok(message)
    }

    /// Respond to a dispatch message on behalf of its officer
    ///
    /// First response wins: a second respond to the same message surfaces
    /// `Conflict` instead of silently succeeding. The read check and the
    /// create/mark-read pair are not one store transaction; this relies on
    /// the single-actor-per-role model, where only one instance responds
    /// for a given officer.
    pub async fn respond(&self, message_id: &str, content: &str) -> Result<Message, EngineError> {
        let content = validate_content_bounded(content, self.max_content_len)
            .ok_or_else(|| EngineError::Validation("response content is empty or too long".to_string()))?;

        let original = match self.bounded(self.store.get_message(message_id)).await? {
            Some(message) => message,
            None => {
                // Stale reference: reconcile before surfacing the error
                warn!(message_id = %message_id, "Respond target not found, refreshing");
                self.reconciler.request_refresh(RefreshScope::Messages).await;
                return Err(EngineError::NotFound(format!("message {message_id}")));
            }
        };

        if !original.from_dispatch {
            return Err(EngineError::Validation(
                "only dispatch messages accept responses".to_string(),
            ));
        }

        if original.read {
            return Err(EngineError::Conflict(format!(
                "message {message_id} already has a response"
            )));
        }

        let response = self
            .bounded(self.store.create_message(
                &original.officer_id,
                content,
                false,
                Some(original.id.clone()),
            ))
            .await?;

        self.bounded(self.store.mark_read(message_id)).await?;

        info!(
            message_id = %message_id,
            response_id = %response.id,
            officer_id = %original.officer_id,
            "Officer response recorded"
        );

        self.publish(Signal::officer_response(&original.officer_id));
        self.reconciler.request_refresh(RefreshScope::Messages).await;

        Ok(response)
    }

    /// Respond with the fixed all-clear content
    pub async fn quick_acknowledge(&self, message_id: &str) -> Result<Message, EngineError> {
        self.respond(message_id, ALL_CLEAR_CONTENT).await
    }

    /// Update an officer's status (vitals ingestion or dispatch override)
    ///
    /// Leaving `Emergency` requires `acknowledged = true`: an emergency is
    /// never silently downgraded without an explicit officer acknowledgment.
    pub async fn update_officer_status(
        &self,
        officer_id: &str,
        status: OfficerStatus,
        acknowledged: bool,
    ) -> Result<Officer, EngineError> {
        let current = self
            .bounded(self.store.get_officer(officer_id))
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("officer {officer_id}")))?;

        if current.status == OfficerStatus::Emergency
            && status != OfficerStatus::Emergency
            && !acknowledged
        {
            return Err(EngineError::Validation(
                "leaving emergency status requires explicit officer acknowledgment".to_string(),
            ));
        }

        let officer = self
            .bounded(self.store.set_officer_status(
                officer_id,
                status,
                current_timestamp_ns(),
            ))
            .await?;

        info!(officer_id = %officer_id, ?status, "Officer status updated");

        self.publish(Signal::status_update(officer_id));
        self.reconciler.request_refresh(RefreshScope::Officers).await;

        Ok(officer)
    }

    /// Unread dispatch messages for an officer, over the current snapshot
    pub fn compute_unread(&self, officer_id: &str) -> usize {
        self.reconciler
            .snapshot()
            .messages
            .iter()
            .filter(|m| m.officer_id == officer_id && m.is_unread_check())
            .count()
    }

    /// Whether dispatch should be prompted to send a status check
    ///
    /// Advisory only; the engine never auto-sends a message.
    pub fn escalation_advisory(&self, officer: &Officer) -> bool {
        officer.status.is_escalated()
    }
}
