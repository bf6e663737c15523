//! Version control collaborator
//!
//! The stack engine never shells out directly; it goes through [`Vcs`] so the
//! evaluator and cascade can be exercised against an in-memory double.

mod git;

pub use git::{GitCli, discover_repo_root};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Outcome of rebasing one branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// Rebase applied cleanly
    Success,
    /// Rebase stopped on conflicts and is left in progress for the user to resolve
    Conflict,
}

/// Commits a local branch and its remote have that the other lacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AheadBehind {
    /// Commits only on the local branch
    pub ahead: usize,
    /// Commits only on the remote branch
    pub behind: usize,
}

/// Git operations the engine depends on
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Root of the working tree
    fn repo_root(&self) -> &Path;

    /// Branch checked out in the working tree
    async fn current_branch(&self) -> Result<String>;

    /// Subject lines of commits reachable from `head` but not `parent`, oldest first
    async fn commits_between(&self, parent: &str, head: &str) -> Result<Vec<String>>;

    /// Best common ancestor of two refs
    async fn merge_base(&self, a: &str, b: &str) -> Result<String>;

    /// Commit id a local branch points at
    async fn branch_tip(&self, branch: &str) -> Result<String>;

    /// Commit id of the branch's remote tracking ref, if it has one
    async fn remote_tracking_tip(&self, branch: &str) -> Result<Option<String>>;

    /// Commit counts between a local branch and its remote tracking ref
    async fn ahead_behind(&self, branch: &str) -> Result<AheadBehind>;

    /// Whether a rebase of `branch` is stopped on unresolved conflicts
    async fn has_unresolved_conflicts(&self, branch: &str) -> Result<bool>;

    /// Fetch the given branches from the remote
    async fn fetch(&self, refs: &[String]) -> Result<()>;

    /// Rebase the commits unique to `branch` (relative to `upstream`) onto `onto`
    async fn rebase(&self, branch: &str, upstream: &str, onto: &str) -> Result<RebaseOutcome>;

    /// Delete a local branch
    async fn delete_branch(&self, branch: &str) -> Result<()>;
}
