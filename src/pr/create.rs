//! Create-or-get a stack branch's PR

use super::{compute_position, derive_title, ensure_stack_label, render_stack_visualization};
use crate::error::{Error, Result};
use crate::platform::{PlatformService, retry_once};
use crate::session::Session;
use crate::stack::Stack;
use crate::types::{NewPullRequest, PullRequest};
use tracing::{debug, info, warn};

/// What to create a PR for
#[derive(Debug, Clone, Default)]
pub struct CreatePrRequest {
    /// Branch to open the PR from; the checked-out branch when `None`
    pub branch: Option<String>,
    /// Open the PR as a draft
    pub draft: bool,
    /// Open the PR in the browser afterwards
    pub open: bool,
}

/// Result of [`create_or_get`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOrGet {
    /// The branch already had a PR; nothing was created
    Existing(PullRequest),
    /// A new PR was created
    Created(PullRequest),
}

impl CreateOrGet {
    /// The PR, whichever way it was obtained
    pub const fn pr(&self) -> &PullRequest {
        match self {
            Self::Existing(pr) | Self::Created(pr) => pr,
        }
    }

    /// Whether a new PR was created
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// The branch a member's PR targets
pub fn resolve_parent(stack: &Stack, branch: &str) -> Result<String> {
    stack
        .parent_of(branch)
        .map(str::to_string)
        .ok_or_else(|| Error::BranchNotInAnyStack(branch.to_string()))
}

/// Look for an existing PR, treating an unparseable response as none
async fn existing_pr(platform: &dyn PlatformService, branch: &str) -> Result<Option<PullRequest>> {
    match retry_once(|| platform.find_pr(branch)).await {
        Err(Error::MalformedHostingResponse(msg)) => {
            warn!(branch, error = %msg, "unreadable PR lookup; assuming no PR");
            Ok(None)
        }
        other => other,
    }
}

/// Return the branch's PR, creating it if there is none.
///
/// The branch must be a member of a tracked stack. Calling this twice for the
/// same branch returns the same PR the second time without creating another.
pub async fn create_or_get(session: &Session<'_>, request: &CreatePrRequest) -> Result<CreateOrGet> {
    let branch = match &request.branch {
        Some(branch) => branch.clone(),
        None => session.vcs.current_branch().await?,
    };
    let stack = session.config.locate_branch(&branch)?;

    if let Some(pr) = existing_pr(session.platform, &branch).await? {
        debug!(branch = %branch, pr_number = pr.number, "PR already exists");
        return Ok(CreateOrGet::Existing(pr));
    }

    let parent = resolve_parent(stack, &branch)?;
    let title = derive_title(session.vcs, &branch, &parent).await;
    let (position, total) = compute_position(stack, &branch)?;
    let body = render_stack_visualization(stack, &branch, Some(session.platform)).await;
    let label = ensure_stack_label(session.platform, position, total).await;

    let created = session
        .platform
        .create_pr(&NewPullRequest {
            head: branch.clone(),
            base: parent,
            title,
            body,
            labels: vec![label],
            draft: request.draft,
        })
        .await;

    let pr = match created {
        Ok(pr) => pr,
        // Someone else opened it between the lookup and the create
        Err(Error::PrAlreadyExists { number, .. }) => {
            debug!(branch = %branch, pr_number = number, "PR appeared while creating");
            return match existing_pr(session.platform, &branch).await? {
                Some(pr) => Ok(CreateOrGet::Existing(pr)),
                None => Err(Error::PrAlreadyExists { branch, number }),
            };
        }
        Err(e) => return Err(e),
    };
    info!(branch = %branch, pr_number = pr.number, "created PR");

    if request.open
        && let Err(e) = session.platform.open_in_browser(&pr).await
    {
        warn!(url = %pr.html_url, error = %e, "could not open browser");
    }

    Ok(CreateOrGet::Created(pr))
}
