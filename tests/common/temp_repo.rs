//! Throwaway git repository for tests that drive the real `git`

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A git repository in a temp dir with `main` checked out and one commit
pub struct TempGitRepo {
    pub dir: TempDir,
    remote: Option<TempDir>,
}

impl TempGitRepo {
    /// Initialise the repository
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Self { dir, remote: None };
        repo.git(&["init", "--quiet", "--initial-branch=main"]);
        // GitCli runs plain `git`, so identity must live in the repo config
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit("README.md", "# test\n", "Initial commit");
        repo
    }

    /// Root of the working tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git, panicking on failure; returns trimmed stdout
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write a file and commit it on the current branch
    pub fn commit(&self, file: &str, contents: &str, message: &str) {
        std::fs::write(self.path().join(file), contents).unwrap();
        self.git(&["add", file]);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    /// Create and check out a branch with one commit on it
    pub fn branch_with_commit(&self, branch: &str, message: &str) {
        self.git(&["checkout", "--quiet", "-b", branch]);
        let file = format!("{}.txt", branch.replace('/', "-"));
        self.commit(&file, branch, message);
    }

    /// Add a bare repository as `origin`
    pub fn add_remote(&mut self) {
        let remote = TempDir::new().unwrap();
        let status = Command::new("git")
            .args(["init", "--quiet", "--bare"])
            .arg(remote.path())
            .status()
            .unwrap();
        assert!(status.success());
        self.git(&["remote", "add", "origin", &remote.path().to_string_lossy()]);
        self.remote = Some(remote);
    }

    /// Force-push branches to `origin`, setting their tracking refs
    pub fn push(&self, branches: &[&str]) {
        for branch in branches {
            self.git(&["push", "--quiet", "--force", "origin", branch]);
        }
    }

    /// Check out an existing branch
    pub fn checkout(&self, branch: &str) {
        self.git(&["checkout", "--quiet", branch]);
    }
}
