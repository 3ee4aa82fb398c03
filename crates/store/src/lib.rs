//! Message store interface for SentinelLink
//!
//! The store is the single source of truth for officers and messages.
//! The engine consumes it purely through the [`MessageStore`] trait;
//! durable backends live behind this seam. This crate ships an in-memory
//! reference implementation matching the upstream process-local store.

#![warn(missing_docs)]

pub mod memory;

use async_trait::async_trait;
use sentinellink_core::{Message, Officer, OfficerStatus};
use thiserror::Error;

pub use memory::MemoryStore;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced officer or message does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend I/O failure
    #[error("Store I/O error: {0}")]
    Io(String),
}

/// Authoritative read/write access to officers and messages
///
/// Ordering contract: `list_messages_for_officer` returns messages
/// oldest-first (conversation order); `list_messages_for_dispatch`
/// returns newest-first (console feed order). `mark_read` is idempotent
/// at this layer; duplicate-response detection is an engine rule above it.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// List the full officer roster
    async fn list_officers(&self) -> Result<Vec<Officer>, StoreError>;

    /// Fetch a single officer
    async fn get_officer(&self, officer_id: &str) -> Result<Option<Officer>, StoreError>;

    /// Insert or replace an officer (roster provisioning hook)
    async fn put_officer(&self, officer: Officer) -> Result<(), StoreError>;

    /// Update an officer's status and last-seen timestamp
    async fn set_officer_status(
        &self,
        officer_id: &str,
        status: OfficerStatus,
        last_seen_ns: u64,
    ) -> Result<Officer, StoreError>;

    /// All messages, newest-first
    async fn list_messages_for_dispatch(&self) -> Result<Vec<Message>, StoreError>;

    /// One officer's messages, oldest-first
    async fn list_messages_for_officer(
        &self,
        officer_id: &str,
    ) -> Result<Vec<Message>, StoreError>;

    /// Fetch a single message
    async fn get_message(&self, message_id: &str) -> Result<Option<Message>, StoreError>;

    /// Create a message; officer responses carry `in_response_to`
    async fn create_message(
        &self,
        officer_id: &str,
        content: &str,
        from_dispatch: bool,
        in_response_to: Option<String>,
    ) -> Result<Message, StoreError>;

    /// Mark a message read; marking an already-read message is a no-op
    async fn mark_read(&self, message_id: &str) -> Result<Message, StoreError>;
}
