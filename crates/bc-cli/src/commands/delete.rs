//! Delete command
//!
//! Delete one comment. Its replies stay stored and drop out of the tree.

use super::{AppContext, IdentityArgs};
use anyhow::{Context, Result};
use bc_core::types::{CommentId, PartitionKey};
use clap::Args;
use colored::Colorize;

/// Delete command arguments
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Blog the comment belongs to
    #[arg(long)]
    pub blog: String,

    /// Comment ID
    pub id: String,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, ctx: &AppContext) -> Result<()> {
    let engine = ctx.open_engine()?;
    let partition = PartitionKey::for_blog(args.blog.as_str());
    let id = CommentId::from_string(args.id.as_str());
    let auth = args.identity.auth_context();

    match engine.remove_comment(&partition, &id, &auth).await {
        Ok(()) => {
            println!("{} Deleted comment {}", "✓".green(), id.to_string().cyan());
            Ok(())
        }
        // Already gone is the outcome the caller asked for
        Err(err) if err.is_not_found() => {
            eprintln!("{} Comment {} not found, nothing to delete", "⚠".yellow(), id);
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("Failed to delete comment {}", id)),
    }
}
