//! Stack overview rendered into PR descriptions

use crate::platform::{PlatformService, lookup_pr};
use crate::stack::Stack;
use crate::types::PrStatus;
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt::Write;

/// Footer appended below the stack tree.
const FOOTER: &str = "_Created with [stackboi](https://github.com/stackboi/stackboi)_";

/// Marker placed after the branch the description belongs to.
const CURRENT_MARKER: &str = "\u{25C0} this PR";

/// PR number and status of a branch at render time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrSummary {
    /// PR number
    pub number: u64,
    /// PR status
    pub status: PrStatus,
}

/// Branch name to PR summary. Branches without a PR are absent.
pub type PrSnapshot = HashMap<String, PrSummary>;

/// Look up the PR of every member concurrently.
///
/// Lookup failures degrade to absent entries.
pub async fn collect_pr_snapshot(stack: &Stack, platform: &dyn PlatformService) -> PrSnapshot {
    let lookups = join_all(stack.branches.iter().map(|b| lookup_pr(platform, b))).await;

    stack
        .branches
        .iter()
        .zip(lookups)
        .filter_map(|(branch, pr)| {
            pr.map(|pr| {
                (
                    branch.clone(),
                    PrSummary {
                        number: pr.number,
                        status: pr.status,
                    },
                )
            })
        })
        .collect()
}

/// Render the stack overview markdown (pure)
///
/// ```text
/// ### Stack Overview
///
/// main (base)
/// ├─ a [#1 open]
/// └─ b [#2 draft] ◀ this PR
/// ```
///
/// The tree is wrapped in a fenced block and followed by a footer.
pub fn format_stack_visualization(stack: &Stack, current: &str, snapshot: &PrSnapshot) -> String {
    let mut out = String::from("### Stack Overview\n\n```\n");
    let _ = writeln!(out, "{} (base)", stack.base_branch);

    let last = stack.branches.len().saturating_sub(1);
    for (i, branch) in stack.branches.iter().enumerate() {
        let glyph = if i == last { "\u{2514}\u{2500}" } else { "\u{251C}\u{2500}" };
        let _ = write!(out, "{glyph} {branch}");
        if let Some(pr) = snapshot.get(branch) {
            let _ = write!(out, " [#{} {}]", pr.number, pr.status);
        }
        if branch == current {
            let _ = write!(out, " {CURRENT_MARKER}");
        }
        out.push('\n');
    }

    out.push_str("```\n\n");
    out.push_str(FOOTER);
    out
}

/// Render the stack overview, looking up PRs when a platform is given
pub async fn render_stack_visualization(
    stack: &Stack,
    current: &str,
    platform: Option<&dyn PlatformService>,
) -> String {
    let snapshot = match platform {
        Some(platform) => collect_pr_snapshot(stack, platform).await,
        None => PrSnapshot::new(),
    };
    format_stack_visualization(stack, current, &snapshot)
}
