//! Repository detection from remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use url::Url;

/// Parse owner/repo (and enterprise host) from a git remote URL.
///
/// Accepts `https://host/owner/repo(.git)` and `git@host:owner/repo(.git)`.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let trimmed = remote_url.trim();

    let (host, path) = if let Some(rest) = trimmed.strip_prefix("git@") {
        rest.split_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .ok_or_else(|| unsupported(remote_url))?
    } else {
        let url = Url::parse(trimmed).map_err(|_| unsupported(remote_url))?;
        let host = url.host_str().ok_or_else(|| unsupported(remote_url))?;
        (host.to_string(), url.path().to_string())
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.rsplit_once('/').ok_or_else(|| unsupported(remote_url))?;
    if owner.is_empty() || repo.is_empty() {
        return Err(unsupported(remote_url));
    }

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != "github.com").then_some(host),
    })
}

fn unsupported(remote_url: &str) -> Error {
    Error::Platform(format!("unsupported remote URL: {remote_url}"))
}
