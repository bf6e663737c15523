//! Progress reporting for cascades

use super::SyncProgress;
use async_trait::async_trait;

/// Receives a snapshot each time a cascade changes state or moves to the
/// next child
#[async_trait]
pub trait CascadeProgress: Send + Sync {
    /// Called after every transition
    async fn on_progress(&self, progress: &SyncProgress);
}

/// Progress sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

#[async_trait]
impl CascadeProgress for NoopProgress {
    async fn on_progress(&self, _progress: &SyncProgress) {}
}
