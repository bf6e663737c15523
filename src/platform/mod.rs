//! Hosting service abstraction
//!
//! Provides the PR and label operations the orchestrator needs, independent
//! of how they reach the hosting service.

mod detection;
mod factory;
mod github;
mod retry;

pub use detection::parse_repo_info;
pub use factory::create_platform_service;
pub use github::GitHubService;
pub use retry::{lookup_pr, retry_once};

/// Prefix shared by every stack position label
pub const STACK_LABEL_PREFIX: &str = "stack:";

use crate::error::Result;
use crate::types::{NewPullRequest, PlatformConfig, PullRequest};
use async_trait::async_trait;

/// Platform service trait for PR operations
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find the most recent PR whose head is `branch`, in any state
    async fn find_pr(&self, branch: &str) -> Result<Option<PullRequest>>;

    /// Create a PR and attach its labels
    async fn create_pr(&self, request: &NewPullRequest) -> Result<PullRequest>;

    /// Create a label if it does not exist yet
    async fn ensure_label(&self, name: &str, description: &str, color: &str) -> Result<()>;

    /// Replace every `stack:*` label on a PR with `label`, leaving other
    /// labels alone
    async fn set_stack_label(&self, pr_number: u64, label: &str) -> Result<()>;

    /// Open a PR in the user's browser
    async fn open_in_browser(&self, pr: &PullRequest) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
