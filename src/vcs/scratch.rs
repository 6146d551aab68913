//! Throwaway repositories for tests that drive the real `git` executable.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Runs git in `dir` and returns its stdout, or `None` if it could not run or failed.
pub fn git(dir: &Path, args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
}

/// A repository on `main` with one commit tracking `a/x.txt` and `b.txt`, or
/// `None` when git is not available on this machine.
pub fn repository() -> Option<TempDir> {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let root = dir.path();

    git(root, &["init", "--quiet", "--initial-branch=main"])?;
    git(root, &["config", "user.email", "test@example.com"])?;
    git(root, &["config", "user.name", "Test"])?;
    git(root, &["config", "commit.gpgsign", "false"])?;
    fs::create_dir_all(root.join("a")).expect("Failed to create dir");
    fs::write(root.join("a/x.txt"), "x").expect("Failed to write file");
    fs::write(root.join("b.txt"), "b").expect("Failed to write file");
    git(root, &["add", "."])?;
    git(root, &["commit", "--quiet", "-m", "initial"])?;
    Some(dir)
}
