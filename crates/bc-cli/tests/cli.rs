use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("blog-comments").unwrap();
    cmd.arg("--no-color")
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--data-dir")
        .arg(dir.join("data"))
        .env_remove("BLOG_COMMENTS_CONFIG")
        .env_remove("BLOG_COMMENTS_DATA_DIR");
    cmd
}

/// Post and return the new comment id (last word of the output)
fn post(dir: &Path, extra: &[&str]) -> String {
    let output = cli(dir).arg("post").args(extra).output().unwrap();
    assert!(output.status.success(), "post failed: {:?}", output);
    String::from_utf8(output.stdout)
        .unwrap()
        .split_whitespace()
        .last()
        .unwrap()
        .to_string()
}

fn tree_json(dir: &Path, blog: &str) -> serde_json::Value {
    let output = cli(dir)
        .args(["tree", "--blog", blog, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help() {
    Command::cargo_bin("blog-comments")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("tree"));
}

#[test]
fn test_empty_tree() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["tree", "--blog", "empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No comments"));
}

#[test]
fn test_post_reply_and_tree() {
    let temp = TempDir::new().unwrap();
    let root = post(
        temp.path(),
        &["--blog", "b1", "--user", "u1", "--name", "alice", "First!"],
    );
    post(temp.path(), &["--blog", "b1", "--parent", root.as_str(), "A reply"]);

    let tree = tree_json(temp.path(), "b1");
    assert_eq!(tree["stored"], 2);
    assert_eq!(tree["visible"], 2);
    assert_eq!(tree["comments"][0]["id"], root.as_str());
    assert_eq!(tree["comments"][0]["author_name"], "alice");
    assert_eq!(tree["comments"][0]["replies"][0]["content"], "A reply");
    assert_eq!(tree["comments"][0]["replies"][0]["author_name"], "Anonymous");

    cli(temp.path())
        .args(["tree", "--blog", "b1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("First!"))
        .stdout(predicate::str::contains("    A reply"));
}

#[test]
fn test_delete_keeps_replies_stored() {
    let temp = TempDir::new().unwrap();
    let auth = ["--user", "u1", "--name", "alice"];
    let root = post(temp.path(), &["--blog", "b1", auth[0], auth[1], auth[2], auth[3], "parent"]);
    post(temp.path(), &["--blog", "b1", "--parent", root.as_str(), "child"]);

    cli(temp.path())
        .args(["delete", "--blog", "b1", root.as_str()])
        .args(auth)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted comment"));

    let tree = tree_json(temp.path(), "b1");
    assert_eq!(tree["stored"], 1);
    assert_eq!(tree["visible"], 0);
    assert_eq!(tree["comments"], serde_json::json!([]));

    cli(temp.path())
        .args(["tree", "--blog", "b1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 stored comment(s) not shown: not reachable from a top-level comment",
        ));

    cli(temp.path())
        .args(["tree", "--blog", "b1", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("replies to missing comment"));
}

#[test]
fn test_delete_by_other_user_is_denied() {
    let temp = TempDir::new().unwrap();
    let id = post(
        temp.path(),
        &["--blog", "b1", "--user", "u1", "--name", "alice", "mine"],
    );

    cli(temp.path())
        .args(["delete", "--blog", "b1", id.as_str(), "--user", "u2", "--name", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));

    assert_eq!(tree_json(temp.path(), "b1")["stored"], 1);
}

#[test]
fn test_delete_missing_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    cli(temp.path())
        .args(["delete", "--blog", "b1", "nope", "--user", "u1", "--name", "alice"])
        .assert()
        .success()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_init_and_show() {
    let temp = TempDir::new().unwrap();

    cli(temp.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(temp.path().join("config.toml").exists());

    cli(temp.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    cli(temp.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();

    cli(temp.path())
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"anonymous_name\": \"Anonymous\""));
}

#[test]
fn test_anonymous_name_from_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[comments]\nanonymous_name = \"Guest\"\n",
    )
    .unwrap();

    post(temp.path(), &["--blog", "b1", "hello"]);

    assert_eq!(tree_json(temp.path(), "b1")["comments"][0]["author_name"], "Guest");
}
