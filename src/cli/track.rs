//! Track and untrack commands - edit stack membership

use crate::cli::context::LocalContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use stackboi::error::{Error, Result};
use stackboi::vcs::Vcs;
use std::path::Path;

/// Track `branch` as stacked on `parent`.
///
/// Without `--parent` the checked-out branch is the parent; if `branch` is
/// itself checked out, the configured default base branch is used.
pub async fn run_track(path: &Path, branch: &str, parent: Option<&str>) -> Result<()> {
    let mut local = LocalContext::open(path).await?;

    // The branch must exist locally
    local.vcs.branch_tip(branch).await?;

    let parent = match parent {
        Some(parent) => parent.to_string(),
        None => {
            let current = local.vcs.current_branch().await?;
            if current == branch {
                local.config.settings.default_base_branch.clone()
            } else {
                current
            }
        }
    };
    local.vcs.branch_tip(&parent).await.map_err(|_| {
        Error::InvalidStack(format!("parent branch '{parent}' does not exist"))
    })?;

    let stack_name = local.config.add_branch(&parent, branch)?;
    local.save()?;

    let (position, total) = local
        .config
        .stack_named(&stack_name)
        .and_then(|s| s.position(branch))
        .unwrap_or((1, 1));
    println!(
        "{} Tracking {} on {} in {} ({position}/{total})",
        check(),
        branch.accent(),
        parent.accent(),
        stack_name.emphasis()
    );
    Ok(())
}

/// Stop tracking `branch`; later members shift down one position
pub async fn run_untrack(path: &Path, branch: &str) -> Result<()> {
    let mut local = LocalContext::open(path).await?;
    let stack = local.config.remove_branch(branch)?;
    local.save()?;

    if stack.branches.is_empty() {
        println!(
            "{} Untracked {}; stack {} removed",
            check(),
            branch.accent(),
            stack.name.emphasis()
        );
    } else {
        println!(
            "{} Untracked {} from {}",
            check(),
            branch.accent(),
            stack.name.emphasis()
        );
    }
    Ok(())
}
