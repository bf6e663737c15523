//! Watch command - live stack status with automatic sync on merge

use crate::cli::context::CommandContext;
use crate::cli::status::print_snapshot;
use crate::cli::style::Stylize;
use crate::cli::sync::{cancel_on_ctrl_c, cascade_merged, confirm, print_cascade_summary};
use anstream::println;
use stackboi::cascade::{CascadeRegistry, SyncState};
use stackboi::config::ConfigStore;
use stackboi::error::Result;
use stackboi::vcs::Vcs;
use stackboi::view::{PendingOverrides, RefreshSources, spawn_refresh};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Run the watch command until Ctrl-C
pub async fn run_watch(path: &Path, interval: Option<Duration>) -> Result<()> {
    let mut ctx = CommandContext::new(path).await?;
    ctx.local
        .vcs
        .apply_rerere(&ctx.local.config.settings.rerere)
        .await?;

    let period = interval.unwrap_or_else(|| ctx.local.config.settings.poll_interval());
    let overrides = PendingOverrides::new();
    let shutdown = cancel_on_ctrl_c();
    let sources = RefreshSources {
        store: Arc::clone(&ctx.local.store) as Arc<dyn ConfigStore>,
        vcs: Arc::clone(&ctx.local.vcs) as Arc<dyn Vcs>,
        platform: Arc::clone(&ctx.platform),
        overrides: overrides.clone(),
    };
    let (mut snapshots, refresh) = spawn_refresh(sources, period, shutdown.child_token());

    let registry = CascadeRegistry::new();
    let cascade_cancel = shutdown.child_token();
    let mut skipped = HashSet::new();

    println!(
        "{} {}",
        "Watching stacks every".muted(),
        format!("{}s", period.as_secs()).accent()
    );

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let Some(snapshot) = snapshots.borrow_and_update().clone() else {
            continue;
        };

        println!();
        println!(
            "{}",
            snapshot.refreshed_at.format("%H:%M:%S").to_string().muted()
        );
        print_snapshot(&snapshot);

        for notification in snapshot.merged_notifications() {
            if skipped.contains(&notification.branch_name)
                || registry.is_running(&notification.stack_name)
            {
                continue;
            }

            println!();
            println!(
                "PR {} for {} was merged",
                format!("#{}", notification.pr_number).accent(),
                notification.branch_name.accent()
            );
            if !confirm("Rebase the branches stacked on it?")? {
                skipped.insert(notification.branch_name.clone());
                continue;
            }

            ctx.local.reload()?;
            let progress = match cascade_merged(
                &mut ctx.local,
                ctx.platform.as_ref(),
                &notification,
                &registry,
                &cascade_cancel,
            )
            .await
            {
                Ok(progress) => progress,
                Err(e) if e.is_terminal() => {
                    shutdown.cancel();
                    return Err(e);
                }
                Err(e) => {
                    warn!(branch = %notification.branch_name, error = %e, "sync failed");
                    skipped.insert(notification.branch_name.clone());
                    continue;
                }
            };
            print_cascade_summary(&progress);

            if progress.state == SyncState::Success {
                for child in &progress.rebased_branches {
                    overrides.clear(child);
                }
            } else {
                overrides.extend(progress.status_overrides());
                skipped.insert(notification.branch_name.clone());
            }
            // Stacks changed; later notifications in this snapshot are stale.
            break;
        }
    }

    shutdown.cancel();
    if let Err(e) = refresh.await {
        warn!(error = %e, "refresh task ended abnormally");
    }
    Ok(())
}
