//! In-memory message store
//!
//! Process-local reference implementation of [`MessageStore`], mirroring
//! the upstream service that held officers and messages in maps. Suitable
//! for tests and single-process deployments; durable backends implement
//! the same trait externally.

use async_trait::async_trait;
use sentinellink_core::{current_timestamp_ns, Message, Officer, OfficerStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{MessageStore, StoreError};

/// In-memory store state
#[derive(Clone, Default)]
pub struct MemoryStore {
    officers: Arc<RwLock<HashMap<String, Officer>>>,
    messages: Arc<RwLock<HashMap<String, Message>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an officer roster
    pub fn with_officers(officers: Vec<Officer>) -> Self {
        let store = Self::new();
        {
            let map = officers
                .into_iter()
                .map(|o| (o.id.clone(), o))
                .collect::<HashMap<_, _>>();
            *store
                .officers
                .try_write()
                .expect("new store is uncontended") = map;
        }
        store
    }

    /// Number of stored messages
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_officers(&self) -> Result<Vec<Officer>, StoreError> {
        let officers = self.officers.read().await;
        let mut list: Vec<Officer> = officers.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    async fn get_officer(&self, officer_id: &str) -> Result<Option<Officer>, StoreError> {
        Ok(self.officers.read().await.get(officer_id).cloned())
    }

    async fn put_officer(&self, officer: Officer) -> Result<(), StoreError> {
        self.officers
            .write()
            .await
            .insert(officer.id.clone(), officer);
        Ok(())
    }

    async fn set_officer_status(
        &self,
        officer_id: &str,
        status: OfficerStatus,
        last_seen_ns: u64,
    ) -> Result<Officer, StoreError> {
        let mut officers = self.officers.write().await;
        let officer = officers
            .get_mut(officer_id)
            .ok_or_else(|| StoreError::NotFound(format!("officer {officer_id}")))?;

        officer.status = status;
        officer.last_seen_ns = last_seen_ns;

        debug!(officer_id = %officer_id, ?status, "Officer status updated");

        Ok(officer.clone())
    }

    async fn list_messages_for_dispatch(&self) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.read().await;
        let mut list: Vec<Message> = messages.values().cloned().collect();
        // Console feed order: newest first
        list.sort_by(|a, b| b.timestamp_ns.cmp(&a.timestamp_ns));
        Ok(list)
    }

    async fn list_messages_for_officer(
        &self,
        officer_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        if !self.officers.read().await.contains_key(officer_id) {
            return Err(StoreError::NotFound(format!("officer {officer_id}")));
        }

        let messages = self.messages.read().await;
        let mut list: Vec<Message> = messages
            .values()
            .filter(|m| m.officer_id == officer_id)
            .cloned()
            .collect();
        // Conversation order: oldest first
        list.sort_by(|a, b| a.timestamp_ns.cmp(&b.timestamp_ns));
        Ok(list)
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<Message>, StoreError> {
        Ok(self.messages.read().await.get(message_id).cloned())
    }

    async fn create_message(
        &self,
        officer_id: &str,
        content: &str,
        from_dispatch: bool,
        in_response_to: Option<String>,
    ) -> Result<Message, StoreError> {
        if !self.officers.read().await.contains_key(officer_id) {
            return Err(StoreError::NotFound(format!("officer {officer_id}")));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            officer_id: officer_id.to_string(),
            from_dispatch,
            content: content.to_string(),
            timestamp_ns: current_timestamp_ns(),
            // Officer-originated messages carry no expected response and
            // are created in their terminal read state.
            read: !from_dispatch,
            in_response_to,
        };

        self.messages
            .write()
            .await
            .insert(message.id.clone(), message.clone());

        debug!(
            message_id = %message.id,
            officer_id = %officer_id,
            from_dispatch,
            "Message created"
        );

        Ok(message)
    }

    async fn mark_read(&self, message_id: &str) -> Result<Message, StoreError> {
        let mut messages = self.messages.write().await;
        let message = messages
            .get_mut(message_id)
            .ok_or_else(|| StoreError::NotFound(format!("message {message_id}")))?;

        // Idempotent: already-read stays read
        message.read = true;

        Ok(message.clone())
    }
}
