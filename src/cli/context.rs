//! Shared command context for CLI commands
//!
//! Extracts the setup shared by every command: finding the repository,
//! loading the tracked stacks and, for commands that talk to the hosting
//! service, authenticating against it.

use stackboi::config::{ConfigStore, FileConfigStore};
use stackboi::error::Result;
use stackboi::platform::{PlatformService, create_platform_service, parse_repo_info};
use stackboi::session::Session;
use stackboi::stack::StackboiConfig;
use stackboi::vcs::{GitCli, Vcs};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Repository, stacks and git access; no network
pub struct LocalContext {
    /// Where the stacks are persisted
    pub store: Arc<FileConfigStore>,
    /// Tracked stacks and settings
    pub config: StackboiConfig,
    /// Git collaborator
    pub vcs: Arc<GitCli>,
}

impl LocalContext {
    /// Open the repository containing `path` and load its stacks
    pub async fn open(path: &Path) -> Result<Self> {
        let vcs = GitCli::open(path).await?;
        let store = FileConfigStore::new(vcs.repo_root());
        let config = store.load_config()?;
        debug!(root = %vcs.repo_root().display(), stacks = config.stacks.len(), "opened repository");

        Ok(Self {
            store: Arc::new(store),
            config,
            vcs: Arc::new(vcs),
        })
    }

    /// Persist the in-memory stacks
    pub fn save(&self) -> Result<()> {
        self.store.save_config(&self.config)
    }

    /// Re-read the stacks from disk
    pub fn reload(&mut self) -> Result<()> {
        self.config = self.store.load_config()?;
        Ok(())
    }
}

/// Shared context for commands that talk to the hosting service
pub struct CommandContext {
    /// Repository, stacks and git access
    pub local: LocalContext,
    /// Hosting service for the remote
    pub platform: Arc<dyn PlatformService>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Open the repository and load its stacks
    /// - Read the remote URL and detect owner/repo
    /// - Authenticate and create the platform service
    pub async fn new(path: &Path) -> Result<Self> {
        let local = LocalContext::open(path).await?;

        let remote_url = local.vcs.remote_url().await?;
        let platform_config = parse_repo_info(&remote_url)?;
        let platform = create_platform_service(&platform_config).await?;

        Ok(Self {
            local,
            platform: Arc::from(platform),
        })
    }

    /// Borrow the stacks and collaborators for one operation
    pub fn session(&self) -> Session<'_> {
        Session::new(
            &self.local.config,
            self.local.vcs.as_ref(),
            self.platform.as_ref(),
        )
    }
}
