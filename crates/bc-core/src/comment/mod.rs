//! Comment system module
//!
//! Holds the comment records, forest assembly and the engine keeping forests
//! in step with a document store.

pub mod model;
pub mod forest;
pub mod engine;
pub mod stream;
pub mod validator;

pub use model::*;
pub use forest::{build_forest, count_comments, find_comment, max_depth, prune_comment};
pub use engine::CommentTreeEngine;
pub use stream::ForestStream;
pub use validator::{RecordIssue, RecordValidator};
