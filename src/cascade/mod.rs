//! Rebase cascade for merged PRs
//!
//! Three-phase pattern:
//! 1. Detect - find merged PRs in tracked stacks (effectful, read-only)
//! 2. Guard - claim the stack so only one cascade runs per stack
//! 3. Execute - fetch, then rebase each descendant in order (effectful)

mod detect;
mod engine;
mod progress;
mod registry;
mod state;

pub use detect::{detect_merged_in_stack, detect_merged_prs};
pub use engine::run_cascade;
pub use progress::{CascadeProgress, NoopProgress};
pub use registry::{CascadeGuard, CascadeRegistry};
pub use state::{MergedPrNotification, SyncProgress, SyncState};
