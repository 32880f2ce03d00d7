//! Error types for blog-comments

use thiserror::Error;

/// Main error type for blog-comments
#[derive(Debug, Error)]
pub enum BlogCommentsError {
    /// The document store could not be reached or failed the request
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The acting principal may not perform the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Comment not found
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<BlogCommentsError>,
    },
}

impl BlogCommentsError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        BlogCommentsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &BlogCommentsError {
        match self {
            BlogCommentsError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the delete target no longer exists.
    ///
    /// Callers removing a comment may treat this as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), BlogCommentsError::CommentNotFound(_))
    }

    /// Transport, backend or permission failure reported by a store
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self.root(),
            BlogCommentsError::StoreUnavailable(_)
                | BlogCommentsError::PermissionDenied(_)
                | BlogCommentsError::Io(_)
        )
    }
}

/// Result type alias for blog-comments
pub type Result<T> = std::result::Result<T, BlogCommentsError>;
