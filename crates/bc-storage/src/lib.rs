//! bc-storage - Storage library for blog-comments
//!
//! This crate provides a durable document store keeping comment partitions on
//! the file system.

mod fs_store;

pub use fs_store::{default_data_dir, FileSystemStore, PartitionFile, CURRENT_SCHEMA_VERSION};
