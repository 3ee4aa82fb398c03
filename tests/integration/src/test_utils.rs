//! Test utilities for engine integration tests

use async_trait::async_trait;
use sentinellink_channel::LocalChannel;
use sentinellink_core::{Config, Message, Officer, OfficerStatus, Role};
use sentinellink_engine::{ConnectionState, SentinelEngine};
use sentinellink_store::{MemoryStore, MessageStore, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Build a roster entry
pub fn test_officer(id: &str, status: OfficerStatus) -> Officer {
    Officer {
        id: id.to_string(),
        name: "Daniel Bernardo".to_string(),
        status,
        last_seen_ns: 1_000,
    }
}

/// Store wrapper that counts authoritative pulls
///
/// `list_officers` is only hit by full refreshes, so its count equals the
/// number of full refreshes the engine performed.
pub struct CountingStore {
    inner: MemoryStore,
    pub officer_lists: AtomicUsize,
    pub message_lists: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            officer_lists: AtomicUsize::new(0),
            message_lists: AtomicUsize::new(0),
        }
    }

    pub fn full_refreshes(&self) -> usize {
        self.officer_lists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageStore for CountingStore {
    async fn list_officers(&self) -> Result<Vec<Officer>, StoreError> {
        self.officer_lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_officers().await
    }

    async fn get_officer(&self, officer_id: &str) -> Result<Option<Officer>, StoreError> {
        self.inner.get_officer(officer_id).await
    }

    async fn put_officer(&self, officer: Officer) -> Result<(), StoreError> {
        self.inner.put_officer(officer).await
    }

    async fn set_officer_status(
        &self,
        officer_id: &str,
        status: OfficerStatus,
        last_seen_ns: u64,
    ) -> Result<Officer, StoreError> {
        self.inner
            .set_officer_status(officer_id, status, last_seen_ns)
            .await
    }

    async fn list_messages_for_dispatch(&self) -> Result<Vec<Message>, StoreError> {
        self.message_lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_messages_for_dispatch().await
    }

    async fn list_messages_for_officer(
        &self,
        officer_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        self.message_lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_messages_for_officer(officer_id).await
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<Message>, StoreError> {
        self.inner.get_message(message_id).await
    }

    async fn create_message(
        &self,
        officer_id: &str,
        content: &str,
        from_dispatch: bool,
        in_response_to: Option<String>,
    ) -> Result<Message, StoreError> {
        self.inner
            .create_message(officer_id, content, from_dispatch, in_response_to)
            .await
    }

    async fn mark_read(&self, message_id: &str) -> Result<Message, StoreError> {
        self.inner.mark_read(message_id).await
    }
}

/// Two-role harness over one shared store and signal hub
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub channel: LocalChannel,
    pub dispatch: SentinelEngine,
    pub officer: SentinelEngine,
}

impl Harness {
    /// Build a dispatch console and one officer client over a seeded roster
    pub fn new(officers: Vec<Officer>, officer_id: &str) -> Self {
        sentinellink_core::logging::init_for_tests();

        let store = Arc::new(MemoryStore::with_officers(officers));
        let channel = LocalChannel::from_config(&Config::default_config().channel);

        let dispatch = build_engine(
            store.clone(),
            &channel,
            Role::Dispatch,
            "console-1",
        );
        let officer = build_engine(
            store.clone(),
            &channel,
            Role::Officer(officer_id.to_string()),
            officer_id,
        );

        Self {
            store,
            channel,
            dispatch,
            officer,
        }
    }

    /// Start both role instances and wait for their channels
    pub async fn start_connected(&self) {
        self.dispatch.start();
        self.officer.start();
        wait_for_state(&self.dispatch, ConnectionState::Connected).await;
        wait_for_state(&self.officer, ConnectionState::Connected).await;
    }
}

/// Construct an engine over any store implementation
pub fn build_engine(
    store: Arc<dyn MessageStore>,
    channel: &LocalChannel,
    role: Role,
    participant_id: &str,
) -> SentinelEngine {
    SentinelEngine::new(
        store,
        Arc::new(channel.clone()),
        Some(channel.clone()),
        role,
        participant_id,
        Config::default_config().engine,
    )
}

/// Wait until an engine reaches a connectivity state
pub async fn wait_for_state(engine: &SentinelEngine, target: ConnectionState) {
    let mut rx = engine.connectivity();
    tokio::time::timeout(Duration::from_secs(2), async {
        while *rx.borrow() != target {
            rx.changed().await.expect("Connectivity channel closed");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Engine never reached {target:?}"));
}

/// Poll a condition until it holds or the deadline passes
pub async fn wait_until<F>(what: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Timed out waiting for: {what}"));
}
