//! Sync command - rebase stacks whose PRs have merged

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, LocalContext};
use crate::cli::style::{Stylize, arrow, check};
use anstream::println;
use dialoguer::Confirm;
use stackboi::cascade::{
    CascadeRegistry, MergedPrNotification, SyncProgress, SyncState, detect_merged_prs,
    run_cascade,
};
use stackboi::config::SyncLock;
use stackboi::error::{Error, Result};
use stackboi::platform::PlatformService;
use stackboi::pr::refresh_stack_labels;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Options for the sync command
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Run the sync command
///
/// Merged PRs are handled one at a time; detection runs again after each
/// cascade because a cascade changes the stacks.
pub async fn run_sync(path: &Path, options: SyncOptions) -> Result<()> {
    let mut ctx = CommandContext::new(path).await?;
    ctx.local
        .vcs
        .apply_rerere(&ctx.local.config.settings.rerere)
        .await?;

    let registry = CascadeRegistry::new();
    let cancel = cancel_on_ctrl_c();
    let mut synced = 0_usize;

    loop {
        let merged = detect_merged_prs(&ctx.local.config, ctx.platform.as_ref()).await;
        let Some(notification) = merged.into_iter().next() else {
            break;
        };

        print_merge_notice(&notification);
        if !options.yes && !confirm("Rebase the branches stacked on it?")? {
            println!("{}", "Aborted".muted());
            return Ok(());
        }

        let progress = cascade_merged(
            &mut ctx.local,
            ctx.platform.as_ref(),
            &notification,
            &registry,
            &cancel,
        )
        .await?;
        print_cascade_summary(&progress);
        halted_error(&progress)?;
        synced += 1;
    }

    if synced == 0 {
        println!("{}", "No merged PRs in tracked stacks".muted());
    } else {
        println!(
            "{} {} merged PR(s) synced",
            format!("{} Sync complete:", check()).success(),
            synced.accent()
        );
    }
    Ok(())
}

/// Cancellation token fired by Ctrl-C
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("ctrl-c received; cancelling at next branch");
            token.cancel();
        }
    });
    cancel
}

/// Ask the user a yes/no question
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))
}

/// Run one cascade and persist the result.
///
/// On success the shrunken stack is saved and its position labels are
/// refreshed.
pub async fn cascade_merged(
    local: &mut LocalContext,
    platform: &dyn PlatformService,
    notification: &MergedPrNotification,
    registry: &CascadeRegistry,
    cancel: &CancellationToken,
) -> Result<SyncProgress> {
    let _guard = registry.begin(&notification.stack_name)?;
    let _lock = SyncLock::acquire(local.vcs.root())?;

    let ui = CliProgress::spinner();
    let progress = run_cascade(
        notification,
        &mut local.config,
        local.vcs.as_ref(),
        &ui,
        cancel,
    )
    .await?;

    if progress.state == SyncState::Success {
        local.save()?;
        if let Some(stack) = local.config.stack_named(&notification.stack_name) {
            for (branch, label) in refresh_stack_labels(stack, platform).await {
                println!("   {} {} {}", "Relabelled".muted(), branch.accent(), label.muted());
            }
        }
    }
    Ok(progress)
}

/// Turn a halted cascade into an error for the exit code
pub fn halted_error(progress: &SyncProgress) -> Result<()> {
    if progress.state != SyncState::Error {
        return Ok(());
    }
    Err(Error::CascadeHalted {
        branch: progress.merged_branch.clone(),
        reason: progress
            .error
            .clone()
            .unwrap_or_else(|| progress.message.clone()),
    })
}

fn print_merge_notice(notification: &MergedPrNotification) {
    println!(
        "PR {} for {} was merged",
        format!("#{}", notification.pr_number).accent(),
        notification.branch_name.accent()
    );
    if notification.child_branches.is_empty() {
        println!("  {}", "No branches stacked on it".muted());
    } else {
        for child in &notification.child_branches {
            println!("  {} {}", arrow(), child);
        }
    }
}

/// Print which children were rebased and which were left behind
pub fn print_cascade_summary(progress: &SyncProgress) {
    if !progress.rebased_branches.is_empty() {
        println!(
            "   Rebased: {}",
            progress.rebased_branches.join(", ").accent()
        );
    }
    if progress.state != SyncState::Error {
        return;
    }
    if let Some(current) = &progress.current_branch {
        println!("   {} {}", "Stopped at:".warn(), current.warn());
    }
    if !progress.pending_branches.is_empty() {
        println!(
            "   {} {}",
            "Pending:".warn(),
            progress.pending_branches.join(", ").muted()
        );
    }
    println!("   {}", "Run 'stackboi sync' again once the branch is fixed.".muted());
}
