//! Explicit per-command context
//!
//! Everything an operation needs is passed in through a `Session` rather than
//! read from process-wide state.

use crate::platform::PlatformService;
use crate::stack::StackboiConfig;
use crate::vcs::Vcs;

/// Borrowed view of the config and collaborators for one operation
#[derive(Clone, Copy)]
pub struct Session<'a> {
    /// Tracked stacks and settings
    pub config: &'a StackboiConfig,
    /// Git collaborator
    pub vcs: &'a dyn Vcs,
    /// Hosting collaborator
    pub platform: &'a dyn PlatformService,
}

impl<'a> Session<'a> {
    /// Bundle a config and its collaborators
    pub fn new(
        config: &'a StackboiConfig,
        vcs: &'a dyn Vcs,
        platform: &'a dyn PlatformService,
    ) -> Self {
        Self {
            config,
            vcs,
            platform,
        }
    }
}
