//! Configuration management for blog-comments

use crate::error::{BlogCommentsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comment settings
    pub comments: CommentConfig,
    /// Storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BlogCommentsError::Toml(e.to_string()))
    }

    /// Render as a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BlogCommentsError::Toml(e.to_string()))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .and_then(|config| {
                config.validate()?;
                Ok(config)
            })
            .map_err(|e| e.with_context(format!("Failed to load {}", path.display())))
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.comments.anonymous_name.trim().is_empty() {
            return Err(BlogCommentsError::Config(
                "comments.anonymous_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Comment-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    /// Author name recorded when nobody is signed in
    pub anonymous_name: String,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            anonymous_name: "Anonymous".to_string(),
        }
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding partition files; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Reject deletes by principals who do not own the comment
    pub enforce_ownership: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            enforce_ownership: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.comments.anonymous_name, "Anonymous");
        assert!(config.storage.enforce_ownership);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("[comments]"));
        assert!(toml.contains("[storage]"));

        let config2 = Config::from_toml_str(&toml).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml_str("[comments]\nanonymous_name = \"Guest\"\n").unwrap();
        assert_eq!(config.comments.anonymous_name, "Guest");
        assert!(config.storage.enforce_ownership);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[comments\n").unwrap_err();
        assert!(matches!(err, BlogCommentsError::Toml(_)));
    }

    #[test]
    fn test_blank_anonymous_name_rejected() {
        let config = Config::from_toml_str("[comments]\nanonymous_name = \"  \"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BlogCommentsError::Config(_)));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
