//! `Vcs` implementation backed by the `git` executable

use super::{AheadBehind, RebaseOutcome, Vcs};
use crate::config::RerereSettings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

/// Default remote name.
const DEFAULT_REMOTE: &str = "origin";

/// Captured output of a finished git command
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Find the top of the working tree containing `path`
pub async fn discover_repo_root(path: &Path) -> Result<PathBuf> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::NotARepository);
    }
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}

/// Git collaborator that runs `git` in a working tree.
///
/// Commands that mutate refs or the working tree take `write_lock`, so
/// a push, rebase, or branch delete never races another one.
pub struct GitCli {
    root: PathBuf,
    remote: String,
    write_lock: Mutex<()>,
}

impl GitCli {
    /// Open the repository containing `path`
    pub async fn open(path: &Path) -> Result<Self> {
        let root = discover_repo_root(path).await?;
        Ok(Self::with_remote(root, DEFAULT_REMOTE))
    }

    /// Use an explicit root and remote name
    pub fn with_remote(root: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            remote: remote.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Top of the working tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remote name used for tracking refs and fetches
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// URL of the remote
    pub async fn remote_url(&self) -> Result<String> {
        let out = self.run(&["remote", "get-url", &self.remote]).await?;
        if !out.success {
            return Err(Error::Config(format!(
                "remote '{}' is not configured",
                self.remote
            )));
        }
        Ok(out.stdout.trim().to_string())
    }

    /// Apply rerere settings to the repository config
    pub async fn apply_rerere(&self, settings: &RerereSettings) -> Result<()> {
        let enabled = settings.enabled.to_string();
        let autoupdate = settings.autoupdate.to_string();
        self.run_checked(&["config", "rerere.enabled", &enabled]).await?;
        self.run_checked(&["config", "rerere.autoupdate", &autoupdate])
            .await?;
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<GitOutput> {
        debug!(?args, "git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .await?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_checked(&self, args: &[&str]) -> Result<String> {
        let out = self.run(args).await?;
        if !out.success {
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                out.stderr.trim()
            )));
        }
        Ok(out.stdout.trim().to_string())
    }

    /// Path of a file inside the git dir (handles worktrees)
    async fn git_path(&self, name: &str) -> Result<PathBuf> {
        let raw = self.run_checked(&["rev-parse", "--git-path", name]).await?;
        let path = PathBuf::from(raw);
        Ok(if path.is_relative() {
            self.root.join(path)
        } else {
            path
        })
    }

    /// Branch a stopped rebase is working on, if any
    async fn rebase_head_name(&self) -> Result<Option<String>> {
        for dir in ["rebase-merge", "rebase-apply"] {
            let head_name = self.git_path(dir).await?.join("head-name");
            if let Ok(contents) = tokio::fs::read_to_string(&head_name).await {
                let name = contents.trim();
                return Ok(Some(
                    name.strip_prefix("refs/heads/").unwrap_or(name).to_string(),
                ));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl Vcs for GitCli {
    fn repo_root(&self) -> &Path {
        &self.root
    }

    async fn current_branch(&self) -> Result<String> {
        self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn commits_between(&self, parent: &str, head: &str) -> Result<Vec<String>> {
        let range = format!("{parent}..{head}");
        let out = self
            .run_checked(&["log", &range, "--format=%s", "--reverse"])
            .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    async fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        self.run_checked(&["merge-base", a, b]).await
    }

    async fn branch_tip(&self, branch: &str) -> Result<String> {
        let refname = format!("refs/heads/{branch}");
        self.run_checked(&["rev-parse", "--verify", &refname]).await
    }

    async fn remote_tracking_tip(&self, branch: &str) -> Result<Option<String>> {
        let refname = format!("refs/remotes/{}/{branch}", self.remote);
        let out = self
            .run(&["rev-parse", "--verify", "--quiet", &refname])
            .await?;
        Ok(out.success.then(|| out.stdout.trim().to_string()))
    }

    async fn ahead_behind(&self, branch: &str) -> Result<AheadBehind> {
        let range = format!("{branch}...{}/{branch}", self.remote);
        let out = self
            .run_checked(&["rev-list", "--left-right", "--count", &range])
            .await?;
        let mut counts = out.split_whitespace().map(str::parse::<usize>);
        match (counts.next(), counts.next()) {
            (Some(Ok(ahead)), Some(Ok(behind))) => Ok(AheadBehind { ahead, behind }),
            _ => Err(Error::Git(format!("unexpected rev-list output: {out}"))),
        }
    }

    async fn has_unresolved_conflicts(&self, branch: &str) -> Result<bool> {
        Ok(self.rebase_head_name().await?.as_deref() == Some(branch))
    }

    async fn fetch(&self, refs: &[String]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        for branch in refs {
            let refspec = format!("+refs/heads/{branch}:refs/remotes/{}/{branch}", self.remote);
            let out = self.run(&["fetch", &self.remote, &refspec]).await?;
            if out.success {
                continue;
            }
            // Branches that were never pushed (or already deleted) have no remote ref
            if out.stderr.contains("couldn't find remote ref") {
                debug!(branch, "no remote ref to fetch");
                continue;
            }
            return Err(Error::TransientNetwork(format!(
                "fetch of '{branch}' failed: {}",
                out.stderr.trim()
            )));
        }
        Ok(())
    }

    async fn rebase(&self, branch: &str, upstream: &str, onto: &str) -> Result<RebaseOutcome> {
        let _guard = self.write_lock.lock().await;
        debug!(branch, upstream, onto, "rebasing");
        let out = self
            .run(&["rebase", "--onto", onto, upstream, branch])
            .await?;
        if out.success {
            return Ok(RebaseOutcome::Success);
        }
        if self.rebase_head_name().await?.is_some() {
            debug!(branch, "rebase stopped on conflicts");
            return Ok(RebaseOutcome::Conflict);
        }
        Err(Error::Git(format!(
            "rebase of '{branch}' failed: {}",
            out.stderr.trim()
        )))
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.run_checked(&["branch", "-D", branch]).await?;
        Ok(())
    }
}
