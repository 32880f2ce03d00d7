//! Comment data models

use super::forest::copy_forest;
use crate::auth::AuthContext;
use crate::types::{CommentId, UserId, ROOT_PARENT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment record as stored in a partition.
///
/// `parent_id` is `None` (or the literal `"root"`) for top-level comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier
    pub id: CommentId,
    /// Comment body, kept verbatim
    #[serde(default)]
    pub content: String,
    /// Author display name captured at creation time
    #[serde(default)]
    pub author_name: String,
    /// Author identifier; absent for anonymous comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    /// Creation time, the only ordering key
    pub created_at: DateTime<Utc>,
    /// Comment this one replies to
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

impl Comment {
    /// Bucket key used when grouping comments by parent
    pub fn parent_key(&self) -> &str {
        match &self.parent_id {
            Some(parent) => parent.as_str(),
            None => ROOT_PARENT,
        }
    }

    /// Check if this comment sits at the top level
    pub fn is_top_level(&self) -> bool {
        self.parent_key() == ROOT_PARENT
    }

    /// Check if this comment replies directly to `parent`
    pub fn is_reply_to(&self, parent: &CommentId) -> bool {
        !self.is_top_level() && self.parent_key() == parent.as_str()
    }
}

/// A comment with its nested replies, as produced by forest assembly
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Wrap a comment with no replies
    pub fn leaf(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }
}

impl Clone for CommentNode {
    fn clone(&self) -> Self {
        Self {
            comment: self.comment.clone(),
            replies: copy_forest(&self.replies, |_| true),
        }
    }
}

// Unlinks replies level by level so a long chain does not drop recursively
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut detached = std::mem::take(&mut self.replies);
        while let Some(mut node) = detached.pop() {
            detached.append(&mut node.replies);
        }
    }
}

/// Top-level comments of a partition, each carrying its replies
pub type Forest = Vec<CommentNode>;

/// A comment someone wants to post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// A top-level comment
    pub fn top_level(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            parent_id: None,
        }
    }

    /// A reply to `parent`
    pub fn reply(parent: CommentId, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            parent_id: Some(parent),
        }
    }

    /// Capture the author from `auth` and produce the payload handed to a store
    pub fn into_payload(self, auth: &AuthContext, anonymous_name: &str) -> CommentPayload {
        CommentPayload {
            content: self.content,
            author_name: auth.author_name(anonymous_name),
            author_id: auth.author_id(),
            parent_id: self.parent_id,
        }
    }
}

/// Fields a store persists for a new comment; the store adds `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub content: String,
    pub author_name: String,
    pub author_id: Option<UserId>,
    pub parent_id: Option<CommentId>,
}

impl CommentPayload {
    /// Materialize the stored record
    pub fn into_comment(self, id: CommentId, created_at: DateTime<Utc>) -> Comment {
        Comment {
            id,
            content: self.content,
            author_name: self.author_name,
            author_id: self.author_id,
            created_at,
            parent_id: self.parent_id,
        }
    }
}
