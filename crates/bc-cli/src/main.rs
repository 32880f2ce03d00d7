//! blog-comments - Threaded blog comments CLI
//!
//! Post, delete and browse nested comments stored on the local file system.
//!
//! ## Quick Start
//!
//! ```bash
//! # Post a comment, then reply to it
//! blog-comments post --blog hello-world --user u1 --name alice "Nice post"
//! blog-comments post --blog hello-world --parent <ID> "Agreed"
//!
//! # Show the tree
//! blog-comments tree --blog hello-world
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
