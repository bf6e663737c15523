//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, STACK_LABEL_PREFIX};
use crate::types::{NewPullRequest, PlatformConfig, PrStatus, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
        })
    }
}

/// Fold GitHub's state, draft flag and merge timestamp into one status
fn status_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PrStatus {
    match pr.state {
        Some(octocrab::models::IssueState::Open) if pr.draft.unwrap_or(false) => PrStatus::Draft,
        Some(octocrab::models::IssueState::Open) => PrStatus::Open,
        _ if pr.merged_at.is_some() => PrStatus::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        _ => PrStatus::Closed,
    }
}

/// 422 "A pull request already exists for owner:branch"
fn is_duplicate_pr(err: &octocrab::GitHubError) -> bool {
    err.status_code.as_u16() == 422
        && err
            .errors
            .iter()
            .flatten()
            .any(|e| e.to_string().contains("already exists"))
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        status: status_from_octocrab(pr),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn find_pr(&self, branch: &str) -> Result<Option<PullRequest>> {
        debug!(branch, "finding PR");
        let head = format!("{}:{}", &self.config.owner, branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::All)
            .sort(octocrab::params::pulls::Sort::Created)
            .direction(octocrab::params::Direction::Descending)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, status = %pr.status, "found PR");
        } else {
            debug!("no PR found");
        }
        Ok(result)
    }

    async fn create_pr(&self, request: &NewPullRequest) -> Result<PullRequest> {
        debug!(head = %request.head, base = %request.base, draft = request.draft, "creating PR");
        let created = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .draft(request.draft)
            .send()
            .await;

        let pr = match created {
            Ok(pr) => pr,
            Err(octocrab::Error::GitHub { source, .. }) if is_duplicate_pr(&source) => {
                let number = self
                    .find_pr(&request.head)
                    .await?
                    .map_or(0, |pr| pr.number);
                return Err(Error::PrAlreadyExists {
                    branch: request.head.clone(),
                    number,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !request.labels.is_empty() {
            self.client
                .issues(&self.config.owner, &self.config.repo)
                .add_labels(pr.number, &request.labels)
                .await?;
        }

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn ensure_label(&self, name: &str, description: &str, color: &str) -> Result<()> {
        debug!(name, "ensuring label");
        let created = self
            .client
            .issues(&self.config.owner, &self.config.repo)
            .create_label(name, color, description)
            .await;

        match created {
            Ok(_) => {
                debug!(name, "created label");
                Ok(())
            }
            // 422 Unprocessable Entity: the label already exists
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 422 => {
                debug!(name, "label already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_stack_label(&self, pr_number: u64, label: &str) -> Result<()> {
        debug!(pr_number, label, "setting stack label");
        let issues = self.client.issues(&self.config.owner, &self.config.repo);

        let current = issues
            .list_labels_for_issue(pr_number)
            .per_page(100)
            .send()
            .await?;

        let mut has_label = false;
        for existing in &current.items {
            if existing.name == label {
                has_label = true;
            } else if existing.name.starts_with(STACK_LABEL_PREFIX) {
                debug!(pr_number, stale = %existing.name, "removing stale stack label");
                issues.remove_label(pr_number, &existing.name).await?;
            }
        }

        if !has_label {
            issues.add_labels(pr_number, &[label.to_string()]).await?;
        }
        Ok(())
    }

    async fn open_in_browser(&self, pr: &PullRequest) -> Result<()> {
        debug!(url = %pr.html_url, "opening PR in browser");
        open::that(&pr.html_url)?;
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
