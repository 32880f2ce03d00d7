//! Referential checks over a partition's records
//!
//! Forest assembly tolerates duplicate ids, unresolvable parents and parent
//! cycles. This validator reports them for callers that want to be stricter.

use super::model::Comment;
use crate::error::{BlogCommentsError, Result};
use crate::types::{CommentId, ROOT_PARENT};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A referential problem found in a record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIssue {
    /// More than one record carries this id
    DuplicateId { id: CommentId, count: usize },
    /// The record's parent is not in the set, so it never shows in the forest
    Orphan { id: CommentId, parent: CommentId },
    /// The parent exists but no chain of parents leads to the top level
    Unreachable { id: CommentId },
    /// The record uses the root sentinel as its own id
    RootSentinelId { id: CommentId },
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIssue::DuplicateId { id, count } => {
                write!(f, "id {} is used by {} records", id, count)
            }
            RecordIssue::Orphan { id, parent } => {
                write!(f, "comment {} replies to missing comment {}", id, parent)
            }
            RecordIssue::Unreachable { id } => {
                write!(f, "comment {} is not reachable from a top-level comment", id)
            }
            RecordIssue::RootSentinelId { id } => {
                write!(f, "comment id {} collides with the root marker", id)
            }
        }
    }
}

/// Validator for partition record sets
#[derive(Debug, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// List every issue, in record order
    pub fn check(&self, records: &[Comment]) -> Vec<RecordIssue> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for comment in records {
            *counts.entry(comment.id.as_str()).or_default() += 1;
        }

        let reached = reachable_ids(records);
        let mut issues = Vec::new();
        let mut reported = HashSet::new();
        for comment in records {
            let count = counts.get(comment.id.as_str()).copied().unwrap_or(0);
            if count > 1 && reported.insert(comment.id.as_str()) {
                issues.push(RecordIssue::DuplicateId {
                    id: comment.id.clone(),
                    count,
                });
            }
            if comment.id.is_root_sentinel() {
                issues.push(RecordIssue::RootSentinelId {
                    id: comment.id.clone(),
                });
            }
            if comment.is_top_level() {
                continue;
            }
            if !counts.contains_key(comment.parent_key()) {
                issues.push(RecordIssue::Orphan {
                    id: comment.id.clone(),
                    parent: CommentId::from(comment.parent_key()),
                });
            } else if !reached.contains(comment.parent_key()) {
                issues.push(RecordIssue::Unreachable {
                    id: comment.id.clone(),
                });
            }
        }
        issues
    }

    /// Fail with a `Validation` error listing every issue
    pub fn validate(&self, records: &[Comment]) -> Result<()> {
        let issues = self.check(records);
        if issues.is_empty() {
            return Ok(());
        }

        let summary = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(BlogCommentsError::Validation(summary))
    }
}

/// Ids of the records shown in the forest, found by walking reply links from
/// the top level
fn reachable_ids(records: &[Comment]) -> HashSet<&str> {
    let mut replies: HashMap<&str, Vec<&str>> = HashMap::new();
    for comment in records {
        replies
            .entry(comment.parent_key())
            .or_default()
            .push(comment.id.as_str());
    }

    let mut reached = HashSet::new();
    let mut pending = vec![ROOT_PARENT];
    while let Some(key) = pending.pop() {
        for &id in replies.get(key).map(Vec::as_slice).unwrap_or(&[]) {
            if reached.insert(id) {
                pending.push(id);
            }
        }
    }
    reached
}
