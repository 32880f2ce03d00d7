//! Per-partition listener registry shared by store implementations

use super::subscription::Subscription;
use super::{Snapshot, SnapshotListener};
use crate::error::Result;
use crate::types::PartitionKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

#[derive(Clone)]
struct ListenerEntry {
    id: u64,
    active: Arc<AtomicBool>,
    /// Highest snapshot version delivered so far
    delivered: Arc<AtomicU64>,
    listener: SnapshotListener,
}

impl ListenerEntry {
    fn deliver(&self, snapshot: &Snapshot) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let previous = self.delivered.fetch_max(snapshot.version, Ordering::SeqCst);
        if previous >= snapshot.version {
            warn!(
                partition = %snapshot.partition,
                version = snapshot.version,
                delivered = previous,
                "Skipping stale snapshot"
            );
            return;
        }
        (self.listener)(snapshot);
    }
}

type Entries = Mutex<HashMap<PartitionKey, Vec<ListenerEntry>>>;

/// Listeners registered per partition.
///
/// Delivery runs without holding the registry lock, so listeners may cancel
/// themselves or register new listeners from inside the callback.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    entries: Arc<Entries>,
    next_id: Arc<AtomicU64>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `partition`.
    ///
    /// The returned handle removes the listener when cancelled or dropped.
    pub fn register(&self, partition: &PartitionKey, listener: SnapshotListener) -> Subscription {
        self.attach(partition, listener).0
    }

    /// Register `listener`, then load the current snapshot and hand it over.
    ///
    /// Registration happens before `load` runs, so a change committed after the
    /// snapshot was read still reaches the listener; if that change is
    /// published first, the older initial snapshot is skipped as stale.
    pub fn register_with_snapshot<F>(
        &self,
        partition: &PartitionKey,
        listener: SnapshotListener,
        load: F,
    ) -> Result<Subscription>
    where
        F: FnOnce() -> Result<Snapshot>,
    {
        let (subscription, entry) = self.attach(partition, listener);
        let initial = load()?;
        entry.deliver(&initial);
        Ok(subscription)
    }

    fn attach(&self, partition: &PartitionKey, listener: SnapshotListener) -> (Subscription, ListenerEntry) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        let entry = ListenerEntry {
            id,
            active: active.clone(),
            delivered: Arc::new(AtomicU64::new(0)),
            listener,
        };

        self.entries
            .lock()
            .entry(partition.clone())
            .or_default()
            .push(entry.clone());
        debug!(%partition, listener = id, "Registered snapshot listener");

        let entries: Weak<Entries> = Arc::downgrade(&self.entries);
        let partition = partition.clone();
        let subscription = Subscription::new(active, move || {
            if let Some(entries) = entries.upgrade() {
                Self::detach(&entries, &partition, id);
            }
        });
        (subscription, entry)
    }

    fn detach(entries: &Entries, partition: &PartitionKey, id: u64) {
        let mut entries = entries.lock();
        if let Some(listeners) = entries.get_mut(partition) {
            listeners.retain(|entry| entry.id != id);
            if listeners.is_empty() {
                entries.remove(partition);
            }
        }
        debug!(%partition, listener = id, "Detached snapshot listener");
    }

    /// Deliver `snapshot` to every active listener of its partition
    pub fn publish(&self, snapshot: &Snapshot) {
        let listeners = self
            .entries
            .lock()
            .get(&snapshot.partition)
            .cloned()
            .unwrap_or_default();

        for entry in &listeners {
            entry.deliver(snapshot);
        }
    }

    /// Number of listeners attached to `partition`
    pub fn listener_count(&self, partition: &PartitionKey) -> usize {
        self.entries
            .lock()
            .get(partition)
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }
}
