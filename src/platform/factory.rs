//! Platform service construction

use super::{GitHubService, PlatformService};
use crate::auth::get_github_auth;
use crate::error::Result;
use crate::types::PlatformConfig;
use tracing::debug;

/// Authenticate and build the service for a repository
pub async fn create_platform_service(config: &PlatformConfig) -> Result<Box<dyn PlatformService>> {
    let auth = get_github_auth(config.host.as_deref()).await?;
    debug!(source = ?auth.source, owner = %config.owner, repo = %config.repo, "authenticated");
    let service = GitHubService::new(
        &auth.token,
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?;
    Ok(Box::new(service))
}
