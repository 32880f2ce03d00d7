//! Forest assembly: flat comment records to nested reply trees
//!
//! Reply chains have no depth limit, so every walk here keeps its own work
//! stack instead of recursing.

use super::model::{Comment, CommentNode, Forest};
use crate::types::{CommentId, ROOT_PARENT};
use std::collections::{HashMap, HashSet};
use std::slice;

/// Comments grouped by normalized parent key, in input order
#[derive(Debug, Default)]
struct ReplyBuckets<'a> {
    by_parent: HashMap<&'a str, Vec<&'a Comment>>,
}

/// A node whose replies are still being assembled
struct Expansion<'b> {
    /// `None` for the top level
    comment: Option<&'b Comment>,
    pending: slice::Iter<'b, &'b Comment>,
    built: Forest,
}

impl<'a> ReplyBuckets<'a> {
    fn from_records(records: &'a [Comment]) -> Self {
        let mut by_parent: HashMap<&'a str, Vec<&'a Comment>> = HashMap::new();
        for comment in records {
            by_parent.entry(comment.parent_key()).or_default().push(comment);
        }
        Self { by_parent }
    }

    fn bucket(&self, key: &str) -> &[&'a Comment] {
        self.by_parent.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build the top level with replies attached, depth first.
    ///
    /// `on_path` holds the ids being expanded above the current node; a node
    /// whose id is already on it gets no replies, so malformed input (duplicate
    /// ids, an id equal to the root sentinel) cannot loop.
    fn nest(&self) -> Forest {
        let mut on_path: HashSet<&str> = HashSet::from([ROOT_PARENT]);
        let mut stack = vec![Expansion {
            comment: None,
            pending: self.bucket(ROOT_PARENT).iter(),
            built: Vec::new(),
        }];

        while let Some(top) = stack.last_mut() {
            if let Some(&comment) = top.pending.next() {
                let id = comment.id.as_str();
                if on_path.contains(id) {
                    top.built.push(CommentNode::leaf(comment.clone()));
                } else {
                    on_path.insert(id);
                    stack.push(Expansion {
                        comment: Some(comment),
                        pending: self.bucket(id).iter(),
                        built: Vec::new(),
                    });
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let Some(comment) = done.comment else {
                return done.built;
            };
            on_path.remove(comment.id.as_str());
            let node = CommentNode {
                comment: comment.clone(),
                replies: done.built,
            };
            if let Some(parent) = stack.last_mut() {
                parent.built.push(node);
            }
        }
        Vec::new()
    }
}

/// Assemble the nested forest of a partition snapshot.
///
/// Records with no parent, or with the literal `"root"` parent, form the top
/// level. Everything else is attached under the record whose id equals its
/// parent. Input order is kept inside each level: callers pass records sorted
/// by `created_at`. A record whose parent is missing from `records` is not
/// part of the result.
pub fn build_forest(records: &[Comment]) -> Forest {
    ReplyBuckets::from_records(records).nest()
}

/// Copy `forest`, leaving out every node rejected by `keep` along with its replies
pub(crate) fn copy_forest(forest: &[CommentNode], keep: impl Fn(&CommentNode) -> bool) -> Forest {
    struct Pending<'b> {
        source: Option<&'b CommentNode>,
        pending: slice::Iter<'b, CommentNode>,
        built: Forest,
    }

    let mut stack = vec![Pending {
        source: None,
        pending: forest.iter(),
        built: Vec::new(),
    }];

    while let Some(top) = stack.last_mut() {
        if let Some(node) = top.pending.next() {
            if keep(node) {
                stack.push(Pending {
                    source: Some(node),
                    pending: node.replies.iter(),
                    built: Vec::new(),
                });
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        let Some(source) = done.source else {
            return done.built;
        };
        let node = CommentNode {
            comment: source.comment.clone(),
            replies: done.built,
        };
        if let Some(parent) = stack.last_mut() {
            parent.built.push(node);
        }
    }
    Vec::new()
}

/// Return a copy of `forest` without the node `id`, at any depth.
///
/// Replies of the removed node go with it, which is what the next rebuild
/// from the store shows as well: the replies stay stored but become orphans.
pub fn prune_comment(forest: &[CommentNode], id: &CommentId) -> Forest {
    copy_forest(forest, |node| node.id() != id)
}

/// Number of comments visible in the forest
pub fn count_comments(forest: &[CommentNode]) -> usize {
    let mut count = 0;
    let mut stack = vec![forest];
    while let Some(level) = stack.pop() {
        count += level.len();
        stack.extend(level.iter().map(|node| node.replies.as_slice()));
    }
    count
}

/// Find a visible comment by id (depth-first, first match)
pub fn find_comment<'a>(forest: &'a [CommentNode], id: &CommentId) -> Option<&'a CommentNode> {
    let mut stack = vec![forest.iter()];
    while let Some(level) = stack.last_mut() {
        match level.next() {
            Some(node) if node.id() == id => return Some(node),
            Some(node) => stack.push(node.replies.iter()),
            None => {
                stack.pop();
            }
        }
    }
    None
}

/// Depth of the deepest reply chain; 0 for an empty forest
pub fn max_depth(forest: &[CommentNode]) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(forest, 1)];
    while let Some((level, depth)) = stack.pop() {
        if level.is_empty() {
            continue;
        }
        deepest = deepest.max(depth);
        stack.extend(level.iter().map(|node| (node.replies.as_slice(), depth + 1)));
    }
    deepest
}
