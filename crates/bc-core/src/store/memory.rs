//! In-memory document store

use super::{DocumentStore, ListenerRegistry, Snapshot, SnapshotListener, Subscription, INITIAL_VERSION};
use crate::auth::AuthContext;
use crate::comment::{Comment, CommentPayload};
use crate::error::{BlogCommentsError, Result};
use crate::types::{CommentId, PartitionKey};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct PartitionState {
    version: u64,
    /// Insertion order
    records: Vec<Comment>,
}

impl PartitionState {
    fn new() -> Self {
        Self {
            version: INITIAL_VERSION,
            records: Vec::new(),
        }
    }

    fn snapshot(&self, partition: &PartitionKey) -> Snapshot {
        Snapshot::ordered(partition.clone(), self.version, self.records.clone())
    }
}

/// Document store kept in process memory.
///
/// Useful for tests and for embedding the engine without persistence. It can
/// be switched offline to exercise store failures.
pub struct MemoryStore {
    partitions: RwLock<HashMap<PartitionKey, PartitionState>>,
    listeners: ListenerRegistry,
    enforce_ownership: bool,
    available: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store that enforces comment ownership on delete
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            listeners: ListenerRegistry::new(),
            enforce_ownership: true,
            available: AtomicBool::new(true),
        }
    }

    /// Set whether deletes are checked against the comment's owner
    pub fn with_ownership(mut self, enforce_ownership: bool) -> Self {
        self.enforce_ownership = enforce_ownership;
        self
    }

    /// Take the store offline (or back online); offline calls fail with `StoreUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Append already-formed records verbatim, ids and timestamps included.
    ///
    /// Counts as one change for subscribers.
    pub fn import(&self, partition: &PartitionKey, records: impl IntoIterator<Item = Comment>) {
        let snapshot = {
            let mut partitions = self.partitions.write();
            let state = partitions
                .entry(partition.clone())
                .or_insert_with(PartitionState::new);
            state.records.extend(records);
            state.version += 1;
            state.snapshot(partition)
        };
        debug!(%partition, count = snapshot.records.len(), "Imported records");
        self.listeners.publish(&snapshot);
    }

    /// Current snapshot of a partition (empty if it was never written)
    pub fn snapshot(&self, partition: &PartitionKey) -> Snapshot {
        self.partitions
            .read()
            .get(partition)
            .map(|state| state.snapshot(partition))
            .unwrap_or_else(|| PartitionState::new().snapshot(partition))
    }

    /// Number of subscribers attached to a partition
    pub fn listener_count(&self, partition: &PartitionKey) -> usize {
        self.listeners.listener_count(partition)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BlogCommentsError::StoreUnavailable(
                "memory store is offline".to_string(),
            ))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn append(&self, partition: &PartitionKey, payload: CommentPayload) -> Result<Comment> {
        self.ensure_available()?;

        let comment = payload.into_comment(CommentId::generate(), Utc::now());
        let snapshot = {
            let mut partitions = self.partitions.write();
            let state = partitions
                .entry(partition.clone())
                .or_insert_with(PartitionState::new);
            state.records.push(comment.clone());
            state.version += 1;
            state.snapshot(partition)
        };

        debug!(%partition, id = %comment.id, version = snapshot.version, "Appended comment");
        self.listeners.publish(&snapshot);
        Ok(comment)
    }

    async fn remove(&self, partition: &PartitionKey, id: &CommentId, auth: &AuthContext) -> Result<()> {
        self.ensure_available()?;

        let snapshot = {
            let mut partitions = self.partitions.write();
            let state = partitions
                .get_mut(partition)
                .ok_or_else(|| BlogCommentsError::CommentNotFound(id.to_string()))?;
            let position = state
                .records
                .iter()
                .position(|comment| &comment.id == id)
                .ok_or_else(|| BlogCommentsError::CommentNotFound(id.to_string()))?;

            if self.enforce_ownership && !auth.can_delete(&state.records[position]) {
                return Err(BlogCommentsError::PermissionDenied(format!(
                    "cannot delete comment {}",
                    id
                )));
            }

            state.records.remove(position);
            state.version += 1;
            state.snapshot(partition)
        };

        info!(%partition, %id, "Removed comment");
        self.listeners.publish(&snapshot);
        Ok(())
    }

    async fn list_ordered(&self, partition: &PartitionKey) -> Result<Vec<Comment>> {
        self.ensure_available()?;
        Ok(self.snapshot(partition).records)
    }

    fn subscribe_ordered(&self, partition: &PartitionKey, listener: SnapshotListener) -> Result<Subscription> {
        self.ensure_available()?;
        self.listeners
            .register_with_snapshot(partition, listener, || Ok(self.snapshot(partition)))
    }
}
