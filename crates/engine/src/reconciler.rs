//! Sync reconciler
//!
//! Maintains the locally consistent snapshot of officers and messages for
//! one client role. Push signals only ever say "re-pull category X"; the
//! reconciler re-queries the authoritative store and swaps the snapshot
//! atomically. Refreshes are strictly serialized: one in flight at a time,
//! with at most one coalesced follow-up scope pending, so signal bursts
//! collapse into a bounded number of store round trips.

use sentinellink_core::{current_timestamp_ns, Message, Officer, Role};
use sentinellink_store::MessageStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use sentinellink_channel::SignalCategory;

/// Locally held, atomically swapped copy of store state
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Officer roster visible to this role
    pub officers: Vec<Officer>,
    /// Messages visible to this role
    pub messages: Vec<Message>,
    /// When the snapshot was last refreshed (ns since epoch, 0 = never)
    pub refreshed_at_ns: u64,
    /// True when the last refresh attempt failed and the data may lag
    pub stale: bool,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            officers: Vec::new(),
            messages: Vec::new(),
            refreshed_at_ns: 0,
            stale: true,
        }
    }
}

/// Entity set a refresh re-pulls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Officer roster only
    Officers,
    /// Messages only
    Messages,
    /// Both entity sets
    Full,
}

impl RefreshScope {
    /// Merge two scopes into the smallest scope covering both
    pub fn merge(self, other: RefreshScope) -> RefreshScope {
        if self == other {
            self
        } else {
            RefreshScope::Full
        }
    }

    fn covers_officers(&self) -> bool {
        matches!(self, RefreshScope::Officers | RefreshScope::Full)
    }

    fn covers_messages(&self) -> bool {
        matches!(self, RefreshScope::Messages | RefreshScope::Full)
    }
}

impl From<SignalCategory> for RefreshScope {
    fn from(category: SignalCategory) -> Self {
        match category {
            SignalCategory::StatusUpdate => RefreshScope::Officers,
            SignalCategory::MessageReceived | SignalCategory::OfficerResponse => {
                RefreshScope::Messages
            }
        }
    }
}

/// Serialized, coalescing snapshot reconciler for one role instance
pub struct SyncReconciler {
    store: Arc<dyn MessageStore>,
    role: Role,
    snapshot: RwLock<Arc<Snapshot>>,
    /// Coalesced scope waiting for the next refresh pass
    pending: Mutex<Option<RefreshScope>>,
    /// Single in-flight refresh guard
    in_flight: AtomicBool,
    store_timeout: Duration,
}

impl SyncReconciler {
    /// Create a reconciler over a store for one role
    pub fn new(store: Arc<dyn MessageStore>, role: Role, store_timeout: Duration) -> Self {
        Self {
            store,
            role,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            pending: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            store_timeout,
        }
    }

    /// Role this reconciler serves
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Current snapshot; never torn, possibly stale
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    /// Request a refresh of the given scope
    ///
    /// If no refresh is in flight this performs it inline. If one is in
    /// flight the scope is coalesced into the single pending slot and the
    /// in-flight pass picks it up, so a burst of signals yields exactly one
    /// follow-up refresh.
    pub async fn request_refresh(&self, scope: RefreshScope) {
        {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            *pending = Some(match pending.take() {
                Some(existing) => existing.merge(scope),
                None => scope,
            });
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            // The in-flight pass will drain the pending slot
            return;
        }

        loop {
            let next = self
                .pending
                .lock()
                .expect("pending lock poisoned")
                .take();

            match next {
                Some(scope) => self.refresh_once(scope).await,
                None => {
                    self.in_flight.store(false, Ordering::Release);
                    // A scope may have landed between the take and the
                    // release; reclaim the guard if so.
                    let has_pending = self
                        .pending
                        .lock()
                        .expect("pending lock poisoned")
                        .is_some();
                    if has_pending && !self.in_flight.swap(true, Ordering::AcqRel) {
                        continue;
                    }
                    break;
                }
            }
        }
    }

    /// One authoritative re-pull and atomic swap
    async fn refresh_once(&self, scope: RefreshScope) {
        let previous = self.snapshot();

        let officers = if scope.covers_officers() {
            match tokio::time::timeout(self.store_timeout, self.store.list_officers()).await {
                Ok(Ok(officers)) => Some(officers),
                Ok(Err(e)) => {
                    warn!(role = ?self.role, error = %e, "Officer refresh failed, keeping stale snapshot");
                    self.mark_stale();
                    return;
                }
                Err(_) => {
                    warn!(role = ?self.role, "Officer refresh timed out, keeping stale snapshot");
                    self.mark_stale();
                    return;
                }
            }
        } else {
            None
        };

        let messages = if scope.covers_messages() {
            let query = async {
                match &self.role {
                    Role::Dispatch => self.store.list_messages_for_dispatch().await,
                    Role::Officer(id) => self.store.list_messages_for_officer(id).await,
                }
            };
            match tokio::time::timeout(self.store_timeout, query).await {
                Ok(Ok(messages)) => Some(messages),
                Ok(Err(e)) => {
                    warn!(role = ?self.role, error = %e, "Message refresh failed, keeping stale snapshot");
                    self.mark_stale();
                    return;
                }
                Err(_) => {
                    warn!(role = ?self.role, "Message refresh timed out, keeping stale snapshot");
                    self.mark_stale();
                    return;
                }
            }
        } else {
            None
        };

        let next = Snapshot {
            officers: officers.unwrap_or_else(|| previous.officers.clone()),
            messages: messages.unwrap_or_else(|| previous.messages.clone()),
            refreshed_at_ns: current_timestamp_ns(),
            stale: false,
        };

        debug!(
            role = ?self.role,
            ?scope,
            officers = next.officers.len(),
            messages = next.messages.len(),
            "Snapshot refreshed"
        );

        *self.snapshot.write().expect("snapshot lock poisoned") = Arc::new(next);
    }

    /// Keep the current data but flag it as possibly lagging
    fn mark_stale(&self) {
        let mut guard = self.snapshot.write().expect("snapshot lock poisoned");
        if !guard.stale {
            let mut degraded = (**guard).clone();
            degraded.stale = true;
            *guard = Arc::new(degraded);
        }
    }
}
