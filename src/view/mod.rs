//! Live stack view
//!
//! Builds immutable [`ViewSnapshot`]s of every tracked stack (PR state plus
//! sync status per branch) and keeps them fresh from a background task.

use crate::cascade::MergedPrNotification;
use crate::config::ConfigStore;
use crate::platform::{PlatformService, lookup_pr};
use crate::stack::{Stack, StackboiConfig};
use crate::status::evaluate_stack;
use crate::types::{BranchInfo, PrStatus, StackWithInfo, SyncStatus};
use crate::vcs::Vcs;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Every tracked stack at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    /// Stacks in config order
    pub stacks: Vec<StackWithInfo>,
    /// When the snapshot was taken
    pub refreshed_at: DateTime<Utc>,
}

impl ViewSnapshot {
    /// Merged PRs visible in this snapshot, one per merged branch
    pub fn merged_notifications(&self) -> Vec<MergedPrNotification> {
        self.stacks
            .iter()
            .flat_map(|info| {
                info.branches.iter().filter_map(|b| {
                    if b.pr_status != PrStatus::Merged {
                        return None;
                    }
                    Some(MergedPrNotification {
                        branch_name: b.name.clone(),
                        pr_number: b.pr_number?,
                        child_branches: info.stack.children_of(&b.name).to_vec(),
                        stack_name: info.stack.name.clone(),
                    })
                })
            })
            .collect()
    }
}

/// One selectable row in the view: a branch and the stack it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    /// Owning stack
    pub stack_name: String,
    /// Branch name
    pub branch_name: String,
}

/// Rows in display order: stacks in order, branches in stack order
pub fn nav_items(stacks: &[StackWithInfo]) -> Vec<NavItem> {
    stacks
        .iter()
        .flat_map(|info| {
            info.branches.iter().map(|b| NavItem {
                stack_name: info.stack.name.clone(),
                branch_name: b.name.clone(),
            })
        })
        .collect()
}

/// Status overrides left by halted cascades, shared with the refresh task.
///
/// Branches listed here are shown as `pending-sync` until the cascade that
/// left them behind is retried.
#[derive(Debug, Clone, Default)]
pub struct PendingOverrides {
    inner: Arc<RwLock<HashMap<String, SyncStatus>>>,
}

impl PendingOverrides {
    /// Empty set of overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace overrides
    pub fn extend(&self, overrides: HashMap<String, SyncStatus>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(overrides);
    }

    /// Drop the override for a branch
    pub fn clear(&self, branch: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(branch);
    }

    /// Copy of the current overrides
    pub fn snapshot(&self) -> HashMap<String, SyncStatus> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Build the live view of one stack.
///
/// Without a platform every branch shows no PR. PR lookup failures degrade
/// to no PR; status failures degrade to `unknown`.
pub async fn build_stack_with_info(
    stack: &Stack,
    vcs: &dyn Vcs,
    platform: Option<&dyn PlatformService>,
    overrides: &HashMap<String, SyncStatus>,
) -> StackWithInfo {
    let pending: HashSet<String> = overrides.keys().cloned().collect();

    let prs = async {
        match platform {
            Some(platform) => {
                join_all(stack.branches.iter().map(|b| lookup_pr(platform, b))).await
            }
            None => vec![None; stack.branches.len()],
        }
    };
    let (evaluations, prs) = tokio::join!(evaluate_stack(vcs, stack, &pending), prs);

    let branches = evaluations
        .into_iter()
        .zip(prs)
        .map(|(eval, pr)| {
            let sync_status = match overrides.get(&eval.branch) {
                Some(status) if eval.status != SyncStatus::Conflicts => *status,
                _ => eval.status,
            };
            BranchInfo {
                name: eval.branch,
                pr_number: pr.as_ref().map(|pr| pr.number),
                pr_status: pr.map_or(PrStatus::None, |pr| pr.status),
                sync_status,
            }
        })
        .collect();

    StackWithInfo {
        stack: stack.clone(),
        branches,
    }
}

/// Build the live view of every stack in `config`
pub async fn build_snapshot(
    config: &StackboiConfig,
    vcs: &dyn Vcs,
    platform: Option<&dyn PlatformService>,
    overrides: &HashMap<String, SyncStatus>,
) -> ViewSnapshot {
    let stacks = join_all(
        config
            .stacks
            .iter()
            .map(|stack| build_stack_with_info(stack, vcs, platform, overrides)),
    )
    .await;

    ViewSnapshot {
        stacks,
        refreshed_at: Utc::now(),
    }
}

/// Everything the refresh task reads from
#[derive(Clone)]
pub struct RefreshSources {
    /// Reloaded every cycle so stack edits show up
    pub store: Arc<dyn ConfigStore>,
    /// Git collaborator
    pub vcs: Arc<dyn Vcs>,
    /// Hosting collaborator
    pub platform: Arc<dyn PlatformService>,
    /// Overrides from halted cascades
    pub overrides: PendingOverrides,
}

/// Periodically rebuild the snapshot until `cancel` fires.
///
/// The first snapshot is taken immediately. Each refresh finishes before the
/// next tick is awaited, and missed ticks are skipped, so refreshes never
/// overlap. The receiver holds `None` until the first snapshot lands.
pub fn spawn_refresh(
    sources: RefreshSources,
    period: Duration,
    cancel: CancellationToken,
) -> (watch::Receiver<Option<Arc<ViewSnapshot>>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("refresh task cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let config = match sources.store.load_config() {
                Ok(config) => config,
                Err(e) => {
                    warn!(error = %e, "could not load stacks; skipping refresh");
                    continue;
                }
            };

            let overrides = sources.overrides.snapshot();
            let snapshot = build_snapshot(
                &config,
                sources.vcs.as_ref(),
                Some(sources.platform.as_ref()),
                &overrides,
            )
            .await;
            debug!(stacks = snapshot.stacks.len(), "refreshed view");

            if tx.send(Some(Arc::new(snapshot))).is_err() {
                debug!("view receiver dropped; stopping refresh");
                break;
            }
        }
    });

    (rx, handle)
}
