//! Document store contract
//!
//! The comment engine reads and writes comments through a [`DocumentStore`]:
//! append a record, remove a record, read a partition in `created_at` order,
//! and subscribe to ordered snapshots of a partition.
//!
//! Two implementations exist: [`MemoryStore`] here, and the file system
//! store in `bc-storage`. Both hand listener bookkeeping to
//! [`ListenerRegistry`].

mod listeners;
mod memory;
mod subscription;

pub use listeners::ListenerRegistry;
pub use memory::MemoryStore;
pub use subscription::Subscription;

use crate::auth::AuthContext;
use crate::comment::{Comment, CommentPayload};
use crate::error::Result;
use crate::types::{CommentId, PartitionKey};
use async_trait::async_trait;
use std::sync::Arc;

/// Version a partition reports before any change was committed
pub const INITIAL_VERSION: u64 = 1;

/// Complete ordered record set of a partition at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub partition: PartitionKey,
    /// Grows by one per committed change, starting at [`INITIAL_VERSION`]
    pub version: u64,
    /// Records sorted by `created_at` ascending, ties in insertion order
    pub records: Vec<Comment>,
}

impl Snapshot {
    /// Build a snapshot from records in insertion order
    pub fn ordered(partition: PartitionKey, version: u64, mut records: Vec<Comment>) -> Self {
        order_by_created_at(&mut records);
        Self {
            partition,
            version,
            records,
        }
    }
}

/// Callback receiving every snapshot of a subscribed partition
pub type SnapshotListener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Sort by `created_at` ascending; the sort is stable, so equal timestamps
/// keep insertion order.
pub fn order_by_created_at(records: &mut [Comment]) {
    records.sort_by_key(|comment| comment.created_at);
}

/// Storage backend holding comment partitions
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a record; the store assigns its id and creation time
    async fn append(&self, partition: &PartitionKey, payload: CommentPayload) -> Result<Comment>;

    /// Delete exactly one record.
    ///
    /// Fails with `CommentNotFound` when no record has this id, and with
    /// `PermissionDenied` when the store refuses `auth`.
    async fn remove(&self, partition: &PartitionKey, id: &CommentId, auth: &AuthContext) -> Result<()>;

    /// Read all records of a partition, ordered by `created_at`
    async fn list_ordered(&self, partition: &PartitionKey) -> Result<Vec<Comment>>;

    /// Deliver the current snapshot of `partition` to `listener`, then one
    /// snapshot per committed change until the subscription is cancelled
    fn subscribe_ordered(&self, partition: &PartitionKey, listener: SnapshotListener) -> Result<Subscription>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: &str, created_at: i64) -> Comment {
        Comment {
            id: CommentId::from(id),
            content: String::new(),
            author_name: "a".to_string(),
            author_id: None,
            created_at: Utc.timestamp_opt(created_at, 0).unwrap(),
            parent_id: None,
        }
    }

    #[test]
    fn test_order_is_stable_on_ties() {
        let mut records = vec![record("c", 2), record("a", 1), record("b", 2), record("d", 1)];
        order_by_created_at(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "c", "b"]);
    }
}
