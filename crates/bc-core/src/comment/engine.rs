//! Comment tree engine: posting, removal and live forests over a document store

use super::forest::build_forest;
use super::model::{Comment, Forest, NewComment};
use super::stream::ForestStream;
use crate::auth::AuthContext;
use crate::config::CommentConfig;
use crate::error::Result;
use crate::store::{DocumentStore, Snapshot, SnapshotListener, Subscription};
use crate::types::{CommentId, PartitionKey};
use futures::channel::mpsc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Keeps nested comment forests in step with a [`DocumentStore`].
///
/// Every snapshot the store delivers is rebuilt into a fresh forest; nothing
/// is patched in place, so forests handed out stay valid for as long as the
/// caller keeps them.
pub struct CommentTreeEngine<S> {
    store: Arc<S>,
    config: CommentConfig,
}

impl<S: DocumentStore + 'static> CommentTreeEngine<S> {
    /// Create an engine with the default comment settings
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, CommentConfig::default())
    }

    /// Create an engine with explicit comment settings
    pub fn with_config(store: Arc<S>, config: CommentConfig) -> Self {
        Self { store, config }
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Get the comment settings
    pub fn config(&self) -> &CommentConfig {
        &self.config
    }

    /// Assemble a forest from a snapshot's records
    pub fn build_forest(records: &[Comment]) -> Forest {
        build_forest(records)
    }

    /// Post a comment as `auth`.
    ///
    /// The author name and id are captured now and never re-resolved. Content
    /// is stored verbatim, empty included.
    pub async fn post_comment(
        &self,
        partition: &PartitionKey,
        comment: NewComment,
        auth: &AuthContext,
    ) -> Result<Comment> {
        let payload = comment.into_payload(auth, &self.config.anonymous_name);
        let comment = self.store.append(partition, payload).await?;
        info!(%partition, id = %comment.id, parent = comment.parent_key(), "Posted comment");
        Ok(comment)
    }

    /// Delete one comment as `auth`.
    ///
    /// Replies are left in place. Store errors come back unchanged and are not
    /// retried. Live forests catch up when the store delivers its next snapshot;
    /// use [`prune_comment`](super::prune_comment) for immediate local feedback.
    pub async fn remove_comment(
        &self,
        partition: &PartitionKey,
        comment_id: &CommentId,
        auth: &AuthContext,
    ) -> Result<()> {
        match self.store.remove(partition, comment_id, auth).await {
            Ok(()) => {
                info!(%partition, id = %comment_id, "Removed comment");
                Ok(())
            }
            Err(err) => {
                warn!(%partition, id = %comment_id, error = %err, "Failed to remove comment");
                Err(err)
            }
        }
    }

    /// Read the partition once and build its forest
    pub async fn fetch_forest(&self, partition: &PartitionKey) -> Result<Forest> {
        let records = self.store.list_ordered(partition).await?;
        Ok(build_forest(&records))
    }

    /// Call `on_forest_changed` with a rebuilt forest for every snapshot of
    /// `partition`, starting with the current one.
    ///
    /// Snapshots are neither coalesced nor reordered. After the returned handle
    /// is cancelled (from anywhere, the callback included) the callback is not
    /// invoked again.
    pub fn subscribe<F>(&self, partition: &PartitionKey, on_forest_changed: F) -> Result<Subscription>
    where
        F: Fn(Forest) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let gate = active.clone();
        let listener: SnapshotListener = Arc::new(move |snapshot: &Snapshot| {
            if !gate.load(Ordering::SeqCst) {
                return;
            }
            let forest = build_forest(&snapshot.records);
            trace!(
                partition = %snapshot.partition,
                version = snapshot.version,
                records = snapshot.records.len(),
                roots = forest.len(),
                "Rebuilt forest"
            );
            if gate.load(Ordering::SeqCst) {
                on_forest_changed(forest);
            }
        });

        let feed = self.store.subscribe_ordered(partition, listener)?;
        debug!(%partition, "Subscribed to comment forest");
        Ok(Subscription::new(active, move || feed.cancel()))
    }

    /// Like [`subscribe`](Self::subscribe), but yields forests as a stream
    pub fn watch(&self, partition: &PartitionKey) -> Result<ForestStream> {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = self.subscribe(partition, move |forest| {
            // The receiver may already be gone; the subscription is then being torn down
            let _ = sender.unbounded_send(forest);
        })?;
        Ok(ForestStream::new(receiver, subscription))
    }
}
