//! Status command - show every tracked stack

use crate::cli::context::{CommandContext, LocalContext};
use crate::cli::style::{Stylize, pr_status, sync_status};
use anstream::println;
use stackboi::error::{Error, Result};
use stackboi::types::{PrStatus, StackWithInfo};
use stackboi::view::{ViewSnapshot, build_snapshot};
use std::collections::HashMap;
use std::path::Path;

/// Options for the status command
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusOptions {
    /// Skip PR lookups
    pub offline: bool,
    /// Print JSON instead of a tree
    pub json: bool,
}

/// Run the status command
pub async fn run_status(path: &Path, options: StatusOptions) -> Result<()> {
    let snapshot = if options.offline {
        let local = LocalContext::open(path).await?;
        build_snapshot(&local.config, local.vcs.as_ref(), None, &HashMap::new()).await
    } else {
        let ctx = CommandContext::new(path).await?;
        build_snapshot(
            &ctx.local.config,
            ctx.local.vcs.as_ref(),
            Some(ctx.platform.as_ref()),
            &HashMap::new(),
        )
        .await
    };

    if options.json {
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| Error::Internal(format!("could not encode status: {e}")))?;
        println!("{json}");
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

/// Print every stack as a tree
pub fn print_snapshot(snapshot: &ViewSnapshot) {
    if snapshot.stacks.is_empty() {
        println!("{}", "No stacks tracked".muted());
        println!("{}", "Run 'stackboi track <branch>' to start one.".muted());
        return;
    }

    for (i, info) in snapshot.stacks.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_stack(info);
    }
}

fn print_stack(info: &StackWithInfo) {
    println!(
        "{} {}",
        info.stack.name.emphasis(),
        format!("(base: {})", info.stack.base_branch).muted()
    );

    let last = info.branches.len().saturating_sub(1);
    for (i, branch) in info.branches.iter().enumerate() {
        let glyph = if i == last { "\u{2514}\u{2500}" } else { "\u{251C}\u{2500}" };
        let pr = match branch.pr_number {
            Some(number) if branch.pr_status != PrStatus::None => {
                format!(" #{} {}", number.accent(), pr_status(branch.pr_status))
            }
            _ => String::new(),
        };
        println!(
            "{} {}{} [{}]",
            glyph.muted(),
            branch.name.accent(),
            pr,
            sync_status(branch.sync_status)
        );
    }
}
