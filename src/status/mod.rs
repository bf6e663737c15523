//! Sync status evaluation
//!
//! Two phases, mirroring the rest of the engine:
//! 1. Gather - read the facts about a branch through [`Vcs`] (effectful, read-only)
//! 2. Classify - turn those facts into a [`SyncStatus`] (pure, testable)
//!
//! Evaluation never fails. A branch whose facts cannot be read is reported as
//! `unknown` with a [`Diagnostic`] so the view can still render every branch.

use crate::error::Result;
use crate::stack::Stack;
use crate::types::SyncStatus;
use crate::vcs::{AheadBehind, Vcs};
use futures::future::join_all;
use std::collections::HashSet;
use std::hash::BuildHasher;
use tracing::warn;

/// How a branch's remote tracking ref relates to the local branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    /// No remote tracking ref
    Missing,
    /// Local and remote point at the same commit
    InSync,
    /// Local has commits the remote lacks (and nothing the other way)
    LocalAhead,
    /// Remote has commits the local branch lacks (and nothing the other way)
    RemoteAhead,
    /// Both sides have commits the other lacks, e.g. after a local rebase
    Diverged,
}

impl RemoteState {
    /// Classify ahead/behind counts between local and remote
    pub const fn from_counts(counts: AheadBehind) -> Self {
        match (counts.ahead, counts.behind) {
            (0, 0) => Self::InSync,
            (_, 0) => Self::LocalAhead,
            (0, _) => Self::RemoteAhead,
            _ => Self::Diverged,
        }
    }
}

/// Everything the classifier needs to know about one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFacts {
    /// Relationship to the remote tracking ref
    pub remote: RemoteState,
    /// Whether the branch contains the current tip of its parent
    pub contains_parent_tip: bool,
    /// Whether a rebase of this branch is stopped on conflicts
    pub has_conflicts: bool,
    /// Whether a cascade has yet to reach this branch
    pub cascade_pending: bool,
}

/// Classify a branch (PURE).
///
/// Priority, highest first: conflicts, needs-rebase, needs-push,
/// pending-sync/unknown, up-to-date.
pub const fn classify(facts: &BranchFacts) -> SyncStatus {
    if facts.has_conflicts {
        return SyncStatus::Conflicts;
    }
    if !facts.contains_parent_tip {
        return SyncStatus::NeedsRebase;
    }
    match facts.remote {
        RemoteState::Missing | RemoteState::LocalAhead | RemoteState::Diverged => {
            SyncStatus::NeedsPush
        }
        RemoteState::RemoteAhead if facts.cascade_pending => SyncStatus::PendingSync,
        RemoteState::RemoteAhead => SyncStatus::Unknown,
        RemoteState::InSync => SyncStatus::UpToDate,
    }
}

/// A read failure encountered while evaluating a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Branch being evaluated
    pub branch: String,
    /// What went wrong
    pub message: String,
}

/// Status of one branch plus any diagnostic explaining an `unknown`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Branch name
    pub branch: String,
    /// Computed status
    pub status: SyncStatus,
    /// Why the status could not be determined, if it couldn't
    pub diagnostic: Option<Diagnostic>,
}

/// Read the facts for `branch` relative to `parent` (EFFECTFUL, read-only)
pub async fn gather_facts(
    vcs: &dyn Vcs,
    branch: &str,
    parent: &str,
    cascade_pending: bool,
) -> Result<BranchFacts> {
    let has_conflicts = vcs.has_unresolved_conflicts(branch).await?;
    let parent_tip = vcs.branch_tip(parent).await?;
    let merge_base = vcs.merge_base(branch, parent).await?;

    let remote = match vcs.remote_tracking_tip(branch).await? {
        None => RemoteState::Missing,
        Some(_) => RemoteState::from_counts(vcs.ahead_behind(branch).await?),
    };

    Ok(BranchFacts {
        remote,
        contains_parent_tip: merge_base == parent_tip,
        has_conflicts,
        cascade_pending,
    })
}

/// Evaluate one stack member. Never fails.
pub async fn evaluate_branch(
    vcs: &dyn Vcs,
    stack: &Stack,
    branch: &str,
    cascade_pending: bool,
) -> Evaluation {
    let facts = match stack.parent_of(branch) {
        Some(parent) => gather_facts(vcs, branch, parent, cascade_pending)
            .await
            .map_err(|e| e.to_string()),
        None => Err(format!("'{branch}' is not a member of stack '{}'", stack.name)),
    };

    match facts {
        Ok(facts) => Evaluation {
            branch: branch.to_string(),
            status: classify(&facts),
            diagnostic: None,
        },
        Err(message) => {
            warn!(branch, %message, "could not determine sync status");
            Evaluation {
                branch: branch.to_string(),
                status: SyncStatus::Unknown,
                diagnostic: Some(Diagnostic {
                    branch: branch.to_string(),
                    message,
                }),
            }
        }
    }
}

/// Evaluate every member of a stack concurrently, returning results in stack order.
///
/// `pending` names branches a cascade has not reached yet.
pub async fn evaluate_stack<S: BuildHasher>(
    vcs: &dyn Vcs,
    stack: &Stack,
    pending: &HashSet<String, S>,
) -> Vec<Evaluation> {
    join_all(
        stack
            .branches
            .iter()
            .map(|b| evaluate_branch(vcs, stack, b, pending.contains(b))),
    )
    .await
}
