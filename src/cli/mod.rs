//! Command-line interface

pub mod context;
pub mod pr;
pub mod status;
pub mod style;
pub mod sync;
pub mod track;
pub mod watch;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use stackboi::cascade::{CascadeProgress, SyncProgress, SyncState};
use stackboi::error::Result;
use std::path::PathBuf;
use std::time::Duration;
use style::{Stylize, check, cross, spinner_style};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "STACKBOI_LOG";

/// Stacked branches and pull requests for git
#[derive(Debug, Parser)]
#[command(name = "stackboi", version, about, long_about = None)]
pub struct Cli {
    /// Path inside the repository (defaults to the current directory)
    #[arg(long, global = true, default_value = ".")]
    pub path: PathBuf,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the PR for a stack branch, or show the one that exists
    Pr {
        /// Branch to open the PR from (defaults to the checked-out branch)
        #[arg(long)]
        branch: Option<String>,

        /// Open the PR as a draft
        #[arg(long)]
        draft: bool,

        /// Do not open the PR in the browser
        #[arg(long)]
        no_open: bool,
    },

    /// Show every tracked stack with PR and sync status
    Status {
        /// Skip PR lookups (no network)
        #[arg(long)]
        offline: bool,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebase stacks whose PRs have merged
    Sync {
        /// Do not ask before rebasing
        #[arg(short, long)]
        yes: bool,
    },

    /// Keep refreshing stack status and sync merged PRs as they land
    Watch {
        /// Poll interval in milliseconds (defaults to the configured interval)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Track a branch as stacked on top of its parent
    Track {
        /// Branch to track
        branch: String,

        /// Branch it was forked from (defaults to the checked-out branch)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Stop tracking a branch
    Untrack {
        /// Branch to stop tracking
        branch: String,
    },
}

impl Cli {
    /// Install the tracing subscriber.
    ///
    /// `STACKBOI_LOG` takes precedence; otherwise warnings only, or debug
    /// with `--verbose`.
    pub fn setup_logging(&self) {
        let default = if self.verbose { "debug" } else { "warn" };
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    /// Dispatch to the selected command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Pr {
                branch,
                draft,
                no_open,
            } => {
                pr::run_pr(
                    &self.path,
                    pr::PrOptions {
                        branch,
                        draft,
                        open: !no_open,
                    },
                )
                .await
            }
            Commands::Status { offline, json } => {
                status::run_status(&self.path, status::StatusOptions { offline, json }).await
            }
            Commands::Sync { yes } => sync::run_sync(&self.path, sync::SyncOptions { yes }).await,
            Commands::Watch { interval_ms } => {
                watch::run_watch(&self.path, interval_ms.map(Duration::from_millis)).await
            }
            Commands::Track { branch, parent } => {
                track::run_track(&self.path, &branch, parent.as_deref()).await
            }
            Commands::Untrack { branch } => track::run_untrack(&self.path, &branch).await,
        }
    }
}

/// Cascade progress rendered on a spinner
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Start a spinner for a cascade
    pub fn spinner() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

#[async_trait]
impl CascadeProgress for CliProgress {
    async fn on_progress(&self, progress: &SyncProgress) {
        match progress.state {
            SyncState::Success => self
                .spinner
                .finish_with_message(format!("{} {}", check(), progress.message)),
            SyncState::Error => self
                .spinner
                .finish_with_message(format!("{} {}", cross(), progress.message.error())),
            _ => {
                let message = progress.current_branch.as_ref().map_or_else(
                    || progress.message.clone(),
                    |branch| format!("Rebasing {}...", branch.accent()),
                );
                self.spinner.set_message(message);
            }
        }
    }
}
