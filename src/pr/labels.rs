//! Stack position labels

use crate::error::{Error, Result};
use crate::platform::{PlatformService, STACK_LABEL_PREFIX, lookup_pr};
use crate::stack::Stack;
use crate::types::PrStatus;
use tracing::{debug, warn};

/// Label color for position labels
pub const STACK_LABEL_COLOR: &str = "5319E7";

/// 1-indexed position of `branch` in `stack` and the stack size
pub fn compute_position(stack: &Stack, branch: &str) -> Result<(usize, usize)> {
    stack
        .position(branch)
        .ok_or_else(|| Error::BranchNotInAnyStack(branch.to_string()))
}

/// Label name for a position, e.g. `stack:2/3`
pub fn position_label(position: usize, total: usize) -> String {
    format!("{STACK_LABEL_PREFIX}{position}/{total}")
}

/// Make sure the label for a position exists on the hosting service.
///
/// Returns the label name. Failures are logged and ignored; the PR can still
/// be created without the label.
pub async fn ensure_stack_label(
    platform: &dyn PlatformService,
    position: usize,
    total: usize,
) -> String {
    let name = position_label(position, total);
    let description = format!("Branch {position} of {total} in stack");

    match platform
        .ensure_label(&name, &description, STACK_LABEL_COLOR)
        .await
    {
        Ok(()) => debug!(label = %name, "stack label ready"),
        Err(e) => warn!(label = %name, error = %e, "could not create stack label"),
    }
    name
}

/// Recompute the position label of every member and move its PR onto it.
///
/// Used after a cascade removes a branch and every later member shifts up.
/// Merged, closed and missing PRs are left alone. Failures are logged and
/// skipped. Returns the relabelled branches with their new labels, in stack
/// order.
pub async fn refresh_stack_labels(
    stack: &Stack,
    platform: &dyn PlatformService,
) -> Vec<(String, String)> {
    let total = stack.branches.len();
    let mut relabelled = Vec::with_capacity(total);

    for (index, branch) in stack.branches.iter().enumerate() {
        let Some(pr) = lookup_pr(platform, branch).await else {
            continue;
        };
        if !matches!(pr.status, PrStatus::Open | PrStatus::Draft) {
            continue;
        }

        let label = ensure_stack_label(platform, index + 1, total).await;
        match platform.set_stack_label(pr.number, &label).await {
            Ok(()) => {
                debug!(branch, pr_number = pr.number, %label, "relabelled PR");
                relabelled.push((branch.clone(), label));
            }
            Err(e) => warn!(branch, pr_number = pr.number, error = %e, "could not relabel PR"),
        }
    }
    relabelled
}
