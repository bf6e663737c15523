//! Cascade state machine types

use crate::error::{Error, Result};
use crate::types::SyncStatus;
use serde::Serialize;
use std::collections::HashMap;

/// Phase of a cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    /// Not started
    Idle,
    /// Fetching remote refs
    Fetching,
    /// Rebasing child branches one at a time
    Rebasing,
    /// All children rebased; merged branch dropped from the stack
    Success,
    /// Halted (conflict, git failure, or cancellation)
    Error,
}

impl SyncState {
    /// Whether the cascade has finished
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Legal transitions: `idle -> fetching -> rebasing -> success | error`.
    ///
    /// A failed fetch may also go straight to `error`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Fetching, Self::Rebasing | Self::Error)
                | (Self::Rebasing, Self::Success | Self::Error)
        )
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
            Self::Rebasing => write!(f, "rebasing"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Progress of one cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    /// Current phase
    pub state: SyncState,
    /// Human-readable status line
    pub message: String,
    /// Branch whose PR merged
    pub merged_branch: String,
    /// Descendants to rebase, oldest first
    pub child_branches: Vec<String>,
    /// Child being rebased (or the one that failed)
    pub current_branch: Option<String>,
    /// Error description once in `Error`
    pub error: Option<String>,
    /// Children rebased cleanly so far
    pub rebased_branches: Vec<String>,
    /// Children never attempted because the cascade halted
    pub pending_branches: Vec<String>,
}

impl SyncProgress {
    /// Fresh progress for a merge of `merged_branch`
    pub fn new(merged_branch: impl Into<String>, child_branches: Vec<String>) -> Self {
        Self {
            state: SyncState::Idle,
            message: String::new(),
            merged_branch: merged_branch.into(),
            child_branches,
            current_branch: None,
            error: None,
            rebased_branches: Vec::new(),
            pending_branches: Vec::new(),
        }
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: SyncState, message: impl Into<String>) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::Internal(format!(
                "invalid cascade transition {} -> {next}",
                self.state
            )));
        }
        self.state = next;
        self.message = message.into();
        Ok(())
    }

    /// Halt the cascade, leaving every child after `current_branch` pending
    pub fn fail(&mut self, message: impl Into<String>, error: impl Into<String>) -> Result<()> {
        self.advance(SyncState::Error, message)?;
        self.error = Some(error.into());
        let current = self.current_branch.as_deref();
        self.pending_branches = self
            .child_branches
            .iter()
            .filter(|b| !self.rebased_branches.contains(b) && Some(b.as_str()) != current)
            .cloned()
            .collect();
        Ok(())
    }

    /// Children left behind by a halted cascade, all `pending-sync`
    pub fn status_overrides(&self) -> HashMap<String, SyncStatus> {
        self.pending_branches
            .iter()
            .map(|b| (b.clone(), SyncStatus::PendingSync))
            .collect()
    }
}

/// A merged PR detected in a stack. Immutable; consumed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedPrNotification {
    /// Branch whose PR merged
    pub branch_name: String,
    /// The merged PR
    pub pr_number: u64,
    /// Descendants that must be rebased, oldest first (possibly empty)
    pub child_branches: Vec<String>,
    /// Stack containing the branch
    pub stack_name: String,
}
