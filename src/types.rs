//! Core types for stackboi

use crate::stack::Stack;
use serde::{Deserialize, Serialize};

/// A pull request on the hosting service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// Lifecycle state (draft folded in)
    pub status: PrStatus,
}

impl PullRequest {
    /// Whether this PR is a draft
    pub fn is_draft(&self) -> bool {
        self.status == PrStatus::Draft
    }
}

/// Request payload for creating a PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Head branch
    pub head: String,
    /// Base branch (the parent in the stack)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body (stack visualization)
    pub body: String,
    /// Labels to attach after creation
    pub labels: Vec<String>,
    /// Open as draft
    pub draft: bool,
}

/// State of a branch's PR as shown in the stack view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrStatus {
    /// Open and ready for review
    Open,
    /// Open as draft
    Draft,
    /// Merged into its base
    Merged,
    /// Closed without merging
    Closed,
    /// No PR exists for the branch
    None,
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Draft => write!(f, "draft"),
            Self::Merged => write!(f, "merged"),
            Self::Closed => write!(f, "closed"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Relationship of a branch to its parent and its remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Rebased on the parent tip and pushed
    UpToDate,
    /// Local commits not on the remote (or no remote branch at all)
    NeedsPush,
    /// Parent moved since this branch was last rebased
    NeedsRebase,
    /// A rebase stopped on conflicts
    Conflicts,
    /// Waiting on a cascade that has not reached this branch
    PendingSync,
    /// Could not be determined
    Unknown,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up-to-date"),
            Self::NeedsPush => write!(f, "needs-push"),
            Self::NeedsRebase => write!(f, "needs-rebase"),
            Self::Conflicts => write!(f, "conflicts"),
            Self::PendingSync => write!(f, "pending-sync"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Live view of one stack member. Derived on every refresh, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    /// Branch name
    pub name: String,
    /// PR number, if a PR exists
    pub pr_number: Option<u64>,
    /// PR state
    pub pr_status: PrStatus,
    /// Sync state relative to parent and remote
    pub sync_status: SyncStatus,
}

/// A stack paired with the live info of each of its branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackWithInfo {
    /// The stack as persisted
    pub stack: Stack,
    /// One entry per branch, in stack order
    pub branches: Vec<BranchInfo>,
}

/// Hosting platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
