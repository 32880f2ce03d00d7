//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod delete;
pub mod post;
pub mod tree;

use anyhow::{Context, Result};
use bc_core::auth::AuthContext;
use bc_core::config::Config;
use bc_core::CommentTreeEngine;
use bc_storage::FileSystemStore;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// blog-comments - Threaded comments for blog posts
#[derive(Debug, Parser)]
#[command(name = "blog-comments")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BLOG_COMMENTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding comment partitions
    #[arg(long, global = true, env = "BLOG_COMMENTS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Post a comment or a reply
    Post(post::PostArgs),

    /// Delete a single comment (replies are kept)
    Delete(delete::DeleteArgs),

    /// Print the comment tree of a blog
    Tree(tree::TreeArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Acting identity; omit both flags to act anonymously
#[derive(Debug, Clone, Default, Args)]
pub struct IdentityArgs {
    /// User id of the acting principal
    #[arg(long, requires = "name")]
    pub user: Option<String>,

    /// Display name of the acting principal
    #[arg(long, requires = "user")]
    pub name: Option<String>,
}

impl IdentityArgs {
    pub fn auth_context(&self) -> AuthContext {
        match (&self.user, &self.name) {
            (Some(user), Some(name)) => AuthContext::user(user.as_str(), name.as_str()),
            _ => AuthContext::Anonymous,
        }
    }
}

/// Resolved settings shared by the commands
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
}

impl AppContext {
    fn resolve(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let config = Config::load(&config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
        let data_dir = data_dir
            .or_else(|| config.storage.data_dir.clone())
            .unwrap_or_else(bc_storage::default_data_dir);

        Ok(Self {
            config,
            config_path,
            data_dir,
        })
    }

    /// Open the file system store and wrap it in an engine
    pub fn open_engine(&self) -> Result<CommentTreeEngine<FileSystemStore>> {
        debug!("Using data directory {:?}", self.data_dir);
        let store = FileSystemStore::new(&self.data_dir)
            .with_context(|| format!("Failed to open data directory {}", self.data_dir.display()))?
            .with_ownership(self.config.storage.enforce_ownership);
        Ok(CommentTreeEngine::with_config(
            Arc::new(store),
            self.config.comments.clone(),
        ))
    }
}

fn default_config_path() -> PathBuf {
    PathBuf::from(".blog-comments/config.toml")
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = AppContext::resolve(cli.config, cli.data_dir)?;

    // Dispatch to command handler
    match cli.command {
        Commands::Config(cmd) => config::execute(cmd, &ctx),
        command => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(dispatch(command, &ctx))
        }
    }
}

async fn dispatch(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Post(args) => post::execute(args, ctx).await,
        Commands::Delete(args) => delete::execute(args, ctx).await,
        Commands::Tree(args) => tree::execute(args, ctx).await,
        Commands::Config(cmd) => config::execute(cmd, ctx),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
