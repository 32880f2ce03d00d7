//! bc-core - Core library for blog-comments
//!
//! This crate provides the comment tree engine: building nested forests from
//! flat comment records, live forests over a document store, and removal with
//! local pruning.

pub mod error;
pub mod types;
pub mod config;
pub mod auth;
pub mod comment;
pub mod store;

pub use error::{BlogCommentsError, Result};
pub use types::*;
pub use auth::{AuthContext, Principal};
pub use comment::CommentTreeEngine;
