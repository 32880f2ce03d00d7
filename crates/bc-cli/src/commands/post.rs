//! Post command
//!
//! Post a top-level comment or a reply.

use super::{AppContext, IdentityArgs};
use anyhow::{Context, Result};
use bc_core::comment::NewComment;
use bc_core::types::{CommentId, PartitionKey};
use clap::Args;
use colored::Colorize;

/// Post command arguments
#[derive(Debug, Args)]
pub struct PostArgs {
    /// Blog whose comments to post under
    #[arg(long)]
    pub blog: String,

    /// Comment to reply to (`root` or omitted for a top-level comment)
    #[arg(long)]
    pub parent: Option<String>,

    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Comment text, stored verbatim
    pub content: String,
}

impl PostArgs {
    fn new_comment(&self) -> NewComment {
        match &self.parent {
            Some(parent) => NewComment::reply(CommentId::from_string(parent.as_str()), self.content.as_str()),
            None => NewComment::top_level(self.content.as_str()),
        }
    }
}

/// Execute the post command
pub async fn execute(args: PostArgs, ctx: &AppContext) -> Result<()> {
    let engine = ctx.open_engine()?;
    let partition = PartitionKey::for_blog(args.blog.as_str());
    let auth = args.identity.auth_context();

    let comment = engine
        .post_comment(&partition, args.new_comment(), &auth)
        .await
        .with_context(|| format!("Failed to post comment on blog {}", partition))?;

    println!(
        "{} Posted comment by {} {}",
        "✓".green(),
        comment.author_name.bold(),
        comment.id.to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parent: Option<&str>) -> PostArgs {
        PostArgs {
            blog: "b".to_string(),
            parent: parent.map(str::to_string),
            identity: IdentityArgs::default(),
            content: "hello".to_string(),
        }
    }

    #[test]
    fn test_new_comment_parent() {
        assert_eq!(args(None).new_comment().parent_id, None);
        assert_eq!(
            args(Some("c1")).new_comment().parent_id,
            Some(CommentId::from("c1"))
        );
        assert_eq!(args(None).new_comment().content, "hello");
    }
}
