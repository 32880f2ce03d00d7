//! File system document store

use async_trait::async_trait;
use bc_core::auth::AuthContext;
use bc_core::comment::{Comment, CommentPayload};
use bc_core::error::{BlogCommentsError, Result};
use bc_core::store::{
    DocumentStore, ListenerRegistry, Snapshot, SnapshotListener, Subscription, INITIAL_VERSION,
};
use bc_core::types::{CommentId, PartitionKey};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema version written into every partition file
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// On-disk layout of one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionFile {
    pub schema_version: u32,
    pub partition: PartitionKey,
    /// Insertion order
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl PartitionFile {
    fn empty(partition: &PartitionKey) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            partition: partition.clone(),
            comments: Vec::new(),
        }
    }
}

/// Resolve the platform data directory (~/.blog-comments as fallback)
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "blog-comments", "blog-comments")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".blog-comments")
        })
}

/// Document store keeping one JSON file per partition.
///
/// Writes go to a temp file that is then renamed over the partition file.
/// Snapshot versions and listeners live in this process only: changes made by
/// another process show up on the next read, not as a pushed snapshot.
pub struct FileSystemStore {
    /// Base directory for storage
    base_dir: PathBuf,
    /// Partitions subdirectory
    partitions_dir: PathBuf,
    /// Serializes read-modify-write cycles and version bumps
    versions: Mutex<HashMap<PartitionKey, u64>>,
    listeners: ListenerRegistry,
    enforce_ownership: bool,
}

impl FileSystemStore {
    /// Create a store under `base_dir` that enforces comment ownership on delete
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let partitions_dir = base_dir.join("partitions");

        let store = Self {
            base_dir,
            partitions_dir,
            versions: Mutex::new(HashMap::new()),
            listeners: ListenerRegistry::new(),
            enforce_ownership: true,
        };

        store.ensure_dirs()?;
        Ok(store)
    }

    /// Create a store in the platform data directory
    pub fn default_location() -> Result<Self> {
        Self::new(default_data_dir())
    }

    /// Set whether deletes are checked against the comment's owner
    pub fn with_ownership(mut self, enforce_ownership: bool) -> Self {
        self.enforce_ownership = enforce_ownership;
        self
    }

    /// Get base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get partitions directory
    pub fn partitions_dir(&self) -> &Path {
        &self.partitions_dir
    }

    /// Number of subscribers attached to a partition
    pub fn listener_count(&self, partition: &PartitionKey) -> usize {
        self.listeners.listener_count(partition)
    }

    fn ensure_dirs(&self) -> Result<()> {
        if !self.partitions_dir.exists() {
            fs::create_dir_all(&self.partitions_dir).map_err(|e| {
                BlogCommentsError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create partitions directory: {}", e),
                ))
            })?;
            debug!("Created partitions directory: {:?}", self.partitions_dir);
        }
        Ok(())
    }

    /// Get the path for a partition file
    fn partition_path(&self, partition: &PartitionKey) -> PathBuf {
        self.partitions_dir
            .join(format!("{}.json", file_stem(partition)))
    }

    /// Get a temporary path for atomic writes
    fn temp_path(&self, partition: &PartitionKey) -> PathBuf {
        self.partitions_dir
            .join(format!(".{}.json.tmp", file_stem(partition)))
    }

    /// Read a partition file; a missing file is an empty partition
    fn read_partition(&self, partition: &PartitionKey) -> Result<PartitionFile> {
        let path = self.partition_path(partition);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PartitionFile::empty(partition));
            }
            Err(e) => return Err(BlogCommentsError::Io(e)),
        };

        let reader = BufReader::new(file);
        let stored: PartitionFile = serde_json::from_reader(reader)
            .map_err(|e| BlogCommentsError::from(e).with_context(format!("Failed to parse {}", path.display())))?;

        if stored.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(BlogCommentsError::UnsupportedSchemaVersion(format!(
                "{} (supported up to {}) in {}",
                stored.schema_version,
                CURRENT_SCHEMA_VERSION,
                path.display()
            )));
        }
        Ok(stored)
    }

    /// Write a partition atomically (write to temp, then rename)
    fn atomic_write(&self, stored: &PartitionFile) -> Result<()> {
        let temp_path = self.temp_path(&stored.partition);
        let final_path = self.partition_path(&stored.partition);

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            BlogCommentsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        discard_temp_on_error(&temp_path, write_json(temp_file, stored))?;

        let renamed = fs::rename(&temp_path, &final_path).map_err(|e| {
            BlogCommentsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        });
        discard_temp_on_error(&temp_path, renamed)?;

        debug!("Saved partition {} to {:?}", stored.partition, final_path);
        Ok(())
    }

    /// Apply `change` to the stored records, persist, and bump the version.
    ///
    /// Returns the snapshot to publish once the lock is released.
    fn commit<T>(
        &self,
        partition: &PartitionKey,
        change: impl FnOnce(&mut Vec<Comment>) -> Result<T>,
    ) -> Result<(T, Snapshot)> {
        let mut versions = self.versions.lock();
        let mut stored = self.read_partition(partition)?;
        let outcome = change(&mut stored.comments)?;
        stored.schema_version = CURRENT_SCHEMA_VERSION;
        self.atomic_write(&stored)?;

        let version = versions.entry(partition.clone()).or_insert(INITIAL_VERSION);
        *version += 1;
        let snapshot = Snapshot::ordered(partition.clone(), *version, stored.comments);
        Ok((outcome, snapshot))
    }

    fn current_snapshot(&self, partition: &PartitionKey) -> Result<Snapshot> {
        let versions = self.versions.lock();
        let stored = self.read_partition(partition)?;
        let version = versions.get(partition).copied().unwrap_or(INITIAL_VERSION);
        Ok(Snapshot::ordered(partition.clone(), version, stored.comments))
    }
}

/// File name for a partition key; bytes outside `[A-Za-z0-9_-]` are hex-escaped
fn file_stem(partition: &PartitionKey) -> String {
    let mut stem = String::with_capacity(partition.as_str().len());
    for byte in partition.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

#[async_trait]
impl DocumentStore for FileSystemStore {
    async fn append(&self, partition: &PartitionKey, payload: CommentPayload) -> Result<Comment> {
        let comment = payload.into_comment(CommentId::generate(), Utc::now());
        let (_, snapshot) = self.commit(partition, |records| {
            records.push(comment.clone());
            Ok(())
        })?;

        debug!(%partition, id = %comment.id, version = snapshot.version, "Appended comment");
        self.listeners.publish(&snapshot);
        Ok(comment)
    }

    async fn remove(&self, partition: &PartitionKey, id: &CommentId, auth: &AuthContext) -> Result<()> {
        let enforce_ownership = self.enforce_ownership;
        let (_, snapshot) = self.commit(partition, |records| {
            let position = records
                .iter()
                .position(|comment| &comment.id == id)
                .ok_or_else(|| BlogCommentsError::CommentNotFound(id.to_string()))?;
            if enforce_ownership && !auth.can_delete(&records[position]) {
                return Err(BlogCommentsError::PermissionDenied(format!(
                    "cannot delete comment {}",
                    id
                )));
            }
            Ok(records.remove(position))
        })?;

        info!(%partition, %id, "Removed comment");
        self.listeners.publish(&snapshot);
        Ok(())
    }

    async fn list_ordered(&self, partition: &PartitionKey) -> Result<Vec<Comment>> {
        Ok(self.current_snapshot(partition)?.records)
    }

    fn subscribe_ordered(&self, partition: &PartitionKey, listener: SnapshotListener) -> Result<Subscription> {
        self.listeners
            .register_with_snapshot(partition, listener, || self.current_snapshot(partition))
    }
}

fn write_json(file: fs::File, stored: &PartitionFile) -> Result<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, stored)?;
    writer.flush()?;
    Ok(())
}

/// Remove the temp file when a write step failed
fn discard_temp_on_error<T>(temp_path: &Path, result: Result<T>) -> Result<T> {
    if result.is_err() {
        if let Err(e) = fs::remove_file(temp_path) {
            debug!("Could not remove temp file {:?}: {}", temp_path, e);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bc_core::comment::NewComment;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (FileSystemStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn blog() -> PartitionKey {
        PartitionKey::for_blog("blog-1")
    }

    fn payload(content: &str, auth: &AuthContext) -> CommentPayload {
        NewComment::top_level(content).into_payload(auth, "Anonymous")
    }

    #[test]
    fn test_store_creation() {
        let (store, temp) = create_test_store();
        assert!(store.partitions_dir().exists());
        assert_eq!(store.base_dir(), temp.path());
    }

    #[test]
    fn test_file_stem_escapes_separators() {
        assert_eq!(file_stem(&PartitionKey::for_blog("blog-1_a")), "blog-1_a");
        assert_eq!(file_stem(&PartitionKey::for_blog("a/b")), "a%2Fb");
        assert_eq!(file_stem(&PartitionKey::for_blog("..")), "%2E%2E");
    }

    #[tokio::test]
    async fn test_missing_partition_is_empty() {
        let (store, _temp) = create_test_store();
        assert!(store.list_ordered(&blog()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_persists_across_instances() {
        let (store, temp) = create_test_store();
        let auth = AuthContext::user("u1", "alice");

        let first = store.append(&blog(), payload("first", &auth)).await.unwrap();
        let second = store.append(&blog(), payload("second", &auth)).await.unwrap();

        let reopened = FileSystemStore::new(temp.path()).unwrap();
        assert_eq!(reopened.list_ordered(&blog()).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_atomic_write() {
        let (store, _temp) = create_test_store();
        let comment = store
            .append(&blog(), payload("x", &AuthContext::Anonymous))
            .await
            .unwrap();

        assert!(!store.temp_path(&blog()).exists());
        let content = fs::read_to_string(store.partition_path(&blog())).unwrap();
        assert!(content.contains("schema_version"));
        assert!(content.contains(comment.id.as_str()));
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let (store, _temp) = create_test_store();
        let final_path = store.partition_path(&blog());
        fs::create_dir_all(final_path.join("occupied")).unwrap();

        let result = store.atomic_write(&PartitionFile::empty(&blog()));

        assert!(matches!(result, Err(BlogCommentsError::Io(_))));
        assert!(!store.temp_path(&blog()).exists());
        assert!(final_path.is_dir());
    }

    #[test]
    fn test_failed_write_step_discards_temp_file() {
        let (store, _temp) = create_test_store();
        let temp_path = store.temp_path(&blog());

        fs::write(&temp_path, "{\"partial\":").unwrap();
        let failed: Result<()> = Err(BlogCommentsError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )));
        let result = discard_temp_on_error(&temp_path, failed);
        assert!(result.unwrap_err().to_string().contains("disk full"));
        assert!(!temp_path.exists());

        fs::write(&temp_path, "{}").unwrap();
        discard_temp_on_error(&temp_path, Ok(())).unwrap();
        assert!(temp_path.exists());
    }

    #[tokio::test]
    async fn test_remove_exactly_one() {
        let (store, _temp) = create_test_store();
        let auth = AuthContext::user("u1", "alice");
        let parent = store.append(&blog(), payload("parent", &auth)).await.unwrap();
        let reply = store
            .append(
                &blog(),
                NewComment::reply(parent.id.clone(), "reply").into_payload(&auth, "Anonymous"),
            )
            .await
            .unwrap();

        store.remove(&blog(), &parent.id, &auth).await.unwrap();

        assert_eq!(store.list_ordered(&blog()).await.unwrap(), vec![reply]);
    }

    #[tokio::test]
    async fn test_remove_errors() {
        let (store, _temp) = create_test_store();
        let alice = AuthContext::user("u1", "alice");

        let err = store
            .remove(&blog(), &CommentId::from("missing"), &alice)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let comment = store.append(&blog(), payload("mine", &alice)).await.unwrap();
        let err = store
            .remove(&blog(), &comment.id, &AuthContext::user("u2", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogCommentsError::PermissionDenied(_)));
        assert_eq!(store.list_ordered(&blog()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ownership_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp.path()).unwrap().with_ownership(false);
        let comment = store
            .append(&blog(), payload("mine", &AuthContext::user("u1", "alice")))
            .await
            .unwrap();

        store
            .remove(&blog(), &comment.id, &AuthContext::Anonymous)
            .await
            .unwrap();
        assert!(store.list_ordered(&blog()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_schema_version() {
        let (store, _temp) = create_test_store();
        fs::write(
            store.partition_path(&blog()),
            r#"{"schema_version":99,"partition":"blog-1","comments":[]}"#,
        )
        .unwrap();

        let err = store.list_ordered(&blog()).await.unwrap_err();
        assert!(matches!(err, BlogCommentsError::UnsupportedSchemaVersion(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_reports_path() {
        let (store, _temp) = create_test_store();
        fs::write(store.partition_path(&blog()), "not json").unwrap();

        let err = store.list_ordered(&blog()).await.unwrap_err();
        assert!(matches!(err.root(), BlogCommentsError::Serde(_)));
        assert!(err.to_string().contains("blog-1.json"));
    }

    #[tokio::test]
    async fn test_subscribe_receives_versions_in_order() {
        let (store, _temp) = create_test_store();
        let auth = AuthContext::user("u1", "alice");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: SnapshotListener = Arc::new(move |snapshot: &Snapshot| {
            sink.lock().push((snapshot.version, snapshot.records.len()));
        });

        let sub = store.subscribe_ordered(&blog(), listener).unwrap();
        let a = store.append(&blog(), payload("a", &auth)).await.unwrap();
        store.append(&blog(), payload("b", &auth)).await.unwrap();
        store.remove(&blog(), &a.id, &auth).await.unwrap();

        assert_eq!(*seen.lock(), vec![(1, 0), (2, 1), (3, 2), (4, 1)]);

        sub.cancel();
        assert_eq!(store.listener_count(&blog()), 0);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_file_untouched() {
        let (store, _temp) = create_test_store();
        let auth = AuthContext::user("u1", "alice");
        store.append(&blog(), payload("kept", &auth)).await.unwrap();
        let before = fs::read_to_string(store.partition_path(&blog())).unwrap();

        let _ = store.remove(&blog(), &CommentId::from("missing"), &auth).await;

        let after = fs::read_to_string(store.partition_path(&blog())).unwrap();
        assert_eq!(before, after);
    }
}
