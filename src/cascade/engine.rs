//! Cascade execution - effectful operations
//!
//! Rebases the descendants of a merged branch one at a time, oldest first.
//! Each rebase moves the base the next child needs, so children are never
//! processed concurrently. The first conflict halts the cascade and every
//! later child is left untouched.

use super::{CascadeProgress, MergedPrNotification, SyncProgress, SyncState};
use crate::error::{Error, Result};
use crate::stack::StackboiConfig;
use crate::vcs::{RebaseOutcome, Vcs};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where the next child gets rebased from and to
struct RebaseBase {
    /// Old tip of the previous branch; commits up to here are dropped
    upstream: String,
    /// New tip to replay the child's own commits onto
    onto: String,
}

/// Tip a branch should be rebased onto: the fetched remote tip if there is one
async fn fresh_tip(vcs: &dyn Vcs, branch: &str) -> Result<String> {
    match vcs.remote_tracking_tip(branch).await? {
        Some(tip) => Ok(tip),
        None => vcs.branch_tip(branch).await,
    }
}

/// Run a cascade for one merged PR (EFFECTFUL)
///
/// On success the merged branch is removed from `config` (the caller saves
/// it). Conflicts, git failures and cancellation end in `SyncState::Error`
/// and are reported through the returned progress rather than as `Err`.
/// `Err` is reserved for a notification that does not match the config.
///
/// Cancellation is only observed between children; a rebase in progress is
/// always allowed to finish.
pub async fn run_cascade(
    notification: &MergedPrNotification,
    config: &mut StackboiConfig,
    vcs: &dyn Vcs,
    progress: &dyn CascadeProgress,
    cancel: &CancellationToken,
) -> Result<SyncProgress> {
    let merged = notification.branch_name.as_str();
    let stack = config.locate_branch(merged)?;
    let parent = stack
        .parent_of(merged)
        .ok_or_else(|| Error::BranchNotInAnyStack(merged.to_string()))?
        .to_string();

    let mut state = SyncProgress::new(merged, notification.child_branches.clone());
    info!(
        merged,
        pr_number = notification.pr_number,
        children = state.child_branches.len(),
        "starting cascade"
    );

    // idle -> fetching
    state.advance(SyncState::Fetching, "Fetching latest changes...")?;
    progress.on_progress(&state).await;

    let mut refs = vec![parent.clone(), merged.to_string()];
    refs.extend(state.child_branches.iter().cloned());
    if let Err(e) = vcs.fetch(&refs).await {
        state.fail("Fetch failed", e.to_string())?;
        progress.on_progress(&state).await;
        return Ok(state);
    }

    // fetching -> rebasing
    state.advance(SyncState::Rebasing, "Rebasing child branches...")?;
    progress.on_progress(&state).await;

    let mut base = match (vcs.branch_tip(merged).await, fresh_tip(vcs, &parent).await) {
        (Ok(upstream), Ok(onto)) => RebaseBase { upstream, onto },
        (Err(e), _) | (_, Err(e)) => {
            state.fail("Could not resolve rebase base", e.to_string())?;
            progress.on_progress(&state).await;
            return Ok(state);
        }
    };

    for child in notification.child_branches.clone() {
        if cancel.is_cancelled() {
            debug!(next = %child, "cascade cancelled at child boundary");
            state.current_branch = None;
            state.fail("Sync cancelled", "cancelled")?;
            progress.on_progress(&state).await;
            return Ok(state);
        }

        state.current_branch = Some(child.clone());
        state.message = format!("Rebasing {child}...");
        progress.on_progress(&state).await;

        let old_tip = match vcs.branch_tip(&child).await {
            Ok(tip) => tip,
            Err(e) => {
                state.fail(format!("Could not read {child}"), e.to_string())?;
                progress.on_progress(&state).await;
                return Ok(state);
            }
        };

        match vcs.rebase(&child, &base.upstream, &base.onto).await {
            Ok(RebaseOutcome::Success) => {
                let new_tip = match vcs.branch_tip(&child).await {
                    Ok(tip) => tip,
                    Err(e) => {
                        state.fail(format!("Could not read {child}"), e.to_string())?;
                        progress.on_progress(&state).await;
                        return Ok(state);
                    }
                };
                debug!(branch = %child, %new_tip, "rebased");
                state.rebased_branches.push(child);
                base = RebaseBase {
                    upstream: old_tip,
                    onto: new_tip,
                };
            }
            Ok(RebaseOutcome::Conflict) => {
                warn!(branch = %child, "cascade halted on conflicts");
                state.fail(
                    "Rebase failed",
                    Error::RebaseConflict(child.clone()).to_string(),
                )?;
                progress.on_progress(&state).await;
                return Ok(state);
            }
            Err(e) => {
                warn!(branch = %child, error = %e, "cascade halted on git failure");
                state.fail("Rebase failed", e.to_string())?;
                progress.on_progress(&state).await;
                return Ok(state);
            }
        }
    }

    // rebasing -> success
    config.remove_branch(merged)?;
    if let Err(e) = vcs.delete_branch(merged).await {
        warn!(merged, error = %e, "could not delete merged branch");
    }

    state.current_branch = None;
    state.advance(SyncState::Success, "Sync completed successfully!")?;
    progress.on_progress(&state).await;
    info!(merged, rebased = state.rebased_branches.len(), "cascade complete");
    Ok(state)
}
