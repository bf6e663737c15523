//! Single-retry policy for read-only hosting queries.
//!
//! Transient failures get exactly one more attempt after a short pause.
//! Everything else is returned immediately.

use super::PlatformService;
use crate::error::Result;
use crate::types::PullRequest;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Pause before the retry.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Run `operation`, retrying once if it fails transiently
pub async fn retry_once<T, F, Fut>(mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match operation().await {
        Err(e) if e.is_transient() => {
            debug!(error = %e, "transient failure, retrying once");
            tokio::time::sleep(RETRY_DELAY).await;
            operation().await
        }
        other => other,
    }
}

/// Look up a branch's PR for display.
///
/// Never fails: after the retry, any error (including an unparseable
/// response) degrades to "no PR" and is logged.
pub async fn lookup_pr(platform: &dyn PlatformService, branch: &str) -> Option<PullRequest> {
    match retry_once(|| platform.find_pr(branch)).await {
        Ok(pr) => pr,
        Err(e) => {
            warn!(branch, error = %e, "PR lookup failed; treating as absent");
            None
        }
    }
}
