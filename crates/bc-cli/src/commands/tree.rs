//! Tree command
//!
//! Print the nested comment tree of a blog.

use super::AppContext;
use anyhow::{Context, Result};
use bc_core::comment::{build_forest, count_comments, CommentNode, Forest, RecordValidator};
use bc_core::store::DocumentStore;
use bc_core::types::PartitionKey;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

/// Tree command arguments
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Blog whose comments to show
    #[arg(long)]
    pub blog: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail if records have duplicate ids or missing parents
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct TreeOutput<'a> {
    blog: &'a str,
    /// Records stored in the partition
    stored: usize,
    /// Records reachable from the top level
    visible: usize,
    comments: &'a Forest,
}

/// Execute the tree command
pub async fn execute(args: TreeArgs, ctx: &AppContext) -> Result<()> {
    let engine = ctx.open_engine()?;
    let partition = PartitionKey::for_blog(args.blog.as_str());

    let records = engine
        .store()
        .list_ordered(&partition)
        .await
        .with_context(|| format!("Failed to read comments of blog {}", partition))?;
    if args.strict {
        RecordValidator::new()
            .validate(&records)
            .with_context(|| format!("Blog {} has inconsistent comments", partition))?;
    }

    let forest = build_forest(&records);
    let visible = count_comments(&forest);

    if args.json {
        let output = TreeOutput {
            blog: partition.as_str(),
            stored: records.len(),
            visible,
            comments: &forest,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if forest.is_empty() {
        println!("No comments on {}.", partition.as_str().bold());
    } else {
        print!("{}", render_forest(&forest));
    }

    let hidden = records.len().saturating_sub(visible);
    if hidden > 0 {
        println!(
            "{}",
            format!(
                "{} stored comment(s) not shown: not reachable from a top-level comment",
                hidden
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Render the forest as indented text, two spaces per level
fn render_forest(forest: &[CommentNode]) -> String {
    let mut out = String::new();
    let mut stack: Vec<(&CommentNode, usize)> = forest.iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        render_node(node, depth, &mut out);
        stack.extend(node.replies.iter().rev().map(|reply| (reply, depth + 1)));
    }
    out
}

fn render_node(node: &CommentNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let comment = &node.comment;
    let when = comment
        .created_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");

    out.push_str(&format!(
        "{}{} {} {}\n",
        indent,
        comment.author_name.bold(),
        when.to_string().dimmed(),
        format!("[{}]", comment.id).cyan()
    ));
    for line in comment.content.lines() {
        out.push_str(&format!("{}  {}\n", indent, line));
    }
}
