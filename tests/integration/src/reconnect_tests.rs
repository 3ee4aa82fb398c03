//! Reconnection behavior
//!
//! The channel is best-effort: signals dropped while disconnected are
//! gone. Correctness rests on the connect-time full refresh, which must
//! run exactly once per transition into the connected state.

use crate::test_utils::*;
use sentinellink_channel::LocalChannel;
use sentinellink_core::{OfficerStatus, Role};
use sentinellink_engine::ConnectionState;
use sentinellink_store::{MemoryStore, MessageStore};
use std::sync::Arc;

#[tokio::test]
async fn test_exactly_one_full_refresh_per_connect() {
    let inner = MemoryStore::with_officers(vec![test_officer(
        "officer-001",
        OfficerStatus::Normal,
    )]);
    let store = Arc::new(CountingStore::new(inner));
    let channel = LocalChannel::new(64);

    let engine = build_engine(
        store.clone() as Arc<dyn MessageStore>,
        &channel,
        Role::Dispatch,
        "console-1",
    );
    engine.start();
    wait_for_state(&engine, ConnectionState::Connected).await;

    wait_until("first connect refresh", || store.full_refreshes() == 1).await;

    // Drop the channel; the supervisor must cycle through disconnected
    channel.close_all();
    wait_for_state(&engine, ConnectionState::Connected).await;

    // Exactly one more full refresh, regardless of how long the gap was
    wait_until("reconnect refresh", || store.full_refreshes() == 2).await;

    // Settle and confirm no refresh storm follows
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(store.full_refreshes(), 2);
}

#[tokio::test]
async fn test_missed_signals_healed_by_reconnect_refresh() {
    let harness = Harness::new(
        vec![test_officer("officer-001", OfficerStatus::Normal)],
        "officer-001",
    );
    harness.start_connected().await;

    // Take the officer's channel down (shared hub: both roles drop)
    harness.channel.close_all();

    // While the officer is offline, dispatch writes straight to the store;
    // the matching signals are lost to the disconnected subscriber
    let check = harness
        .store
        .create_message("officer-001", "Are you okay?", true, None)
        .await
        .expect("Failed to create message");

    // Reconnect heals the gap via the full refresh
    wait_for_state(&harness.officer, ConnectionState::Connected).await;
    wait_until("officer caught up after reconnect", || {
        harness
            .officer
            .snapshot()
            .messages
            .iter()
            .any(|m| m.id == check.id)
    })
    .await;
    assert_eq!(harness.officer.compute_unread("officer-001"), 1);
}

#[tokio::test]
async fn test_connectivity_indicator_tracks_lifecycle() {
    let harness = Harness::new(
        vec![test_officer("officer-001", OfficerStatus::Normal)],
        "officer-001",
    );

    // Before start: disconnected, pull-only
    assert_eq!(
        *harness.dispatch.connectivity().borrow(),
        ConnectionState::Disconnected
    );
    harness.dispatch.refresh().await;
    assert_eq!(harness.dispatch.snapshot().officers.len(), 1);

    harness.dispatch.start();
    wait_for_state(&harness.dispatch, ConnectionState::Connected).await;

    harness.channel.close_all();
    wait_for_state(&harness.dispatch, ConnectionState::Connected).await;
}
