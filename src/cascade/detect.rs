//! Merge detection

use super::MergedPrNotification;
use crate::platform::{PlatformService, lookup_pr};
use crate::stack::{Stack, StackboiConfig};
use crate::types::PrStatus;
use futures::future::join_all;
use tracing::debug;

/// Find every member of `stack` whose PR has merged
pub async fn detect_merged_in_stack(
    stack: &Stack,
    platform: &dyn PlatformService,
) -> Vec<MergedPrNotification> {
    let lookups = join_all(stack.branches.iter().map(|b| lookup_pr(platform, b))).await;

    stack
        .branches
        .iter()
        .zip(lookups)
        .filter_map(|(branch, pr)| {
            let pr = pr.filter(|pr| pr.status == PrStatus::Merged)?;
            debug!(branch, pr_number = pr.number, "detected merged PR");
            Some(MergedPrNotification {
                branch_name: branch.clone(),
                pr_number: pr.number,
                child_branches: stack.children_of(branch).to_vec(),
                stack_name: stack.name.clone(),
            })
        })
        .collect()
}

/// Find merged PRs across all tracked stacks, in stack order
pub async fn detect_merged_prs(
    config: &StackboiConfig,
    platform: &dyn PlatformService,
) -> Vec<MergedPrNotification> {
    let mut merged = Vec::new();
    for stack in &config.stacks {
        merged.extend(detect_merged_in_stack(stack, platform).await);
    }
    merged
}
