//! Explicit authentication context
//!
//! Operations that act on behalf of someone take an [`AuthContext`] argument;
//! there is no process-wide "current user".

use crate::comment::Comment;
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// An authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier of the principal
    pub user_id: UserId,
    /// Display name captured onto the comments this principal posts
    pub display_name: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: UserId::from_string(user_id),
            display_name: display_name.into(),
        }
    }
}

/// Who is performing an operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthContext {
    /// No signed-in principal
    #[default]
    Anonymous,
    /// A signed-in principal
    Authenticated(Principal),
}

impl AuthContext {
    /// Context for a signed-in principal
    pub fn user(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        AuthContext::Authenticated(Principal::new(user_id, display_name))
    }

    /// Check if a principal is signed in
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated(_))
    }

    /// The signed-in principal, if any
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated(principal) => Some(principal),
        }
    }

    /// Identifier recorded as a comment's author
    pub fn author_id(&self) -> Option<UserId> {
        self.principal().map(|p| p.user_id.clone())
    }

    /// Name recorded as a comment's author
    pub fn author_name(&self, anonymous_name: &str) -> String {
        match self {
            AuthContext::Anonymous => anonymous_name.to_string(),
            AuthContext::Authenticated(principal) => principal.display_name.clone(),
        }
    }

    /// Whether this context may delete `comment`.
    ///
    /// Owners may delete their own comments; comments posted anonymously may be
    /// deleted by any signed-in principal.
    pub fn can_delete(&self, comment: &Comment) -> bool {
        match (self.principal(), &comment.author_id) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(principal), Some(owner)) => &principal.user_id == owner,
        }
    }
}
