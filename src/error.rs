//! Error types for stackboi

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// All errors surfaced by the stack engine and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// The working directory is not inside a git repository
    #[error("not a git repository")]
    NotARepository,

    /// No usable credentials for the hosting service
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// Branch is not tracked by any stack
    #[error("branch '{0}' is not part of any stack")]
    BranchNotInAnyStack(String),

    /// Branch is the root of a stack rather than one of its members
    #[error("branch '{0}' is the base branch, not a stack branch")]
    BranchIsBaseBranch(String),

    /// The hosting service refused to open a second PR for this branch
    #[error("PR already exists for branch '{branch}': #{number}")]
    PrAlreadyExists {
        /// Head branch
        branch: String,
        /// Existing PR number
        number: u64,
    },

    /// A rebase stopped on conflicts that need manual resolution
    #[error("rebase of '{0}' stopped with conflicts")]
    RebaseConflict(String),

    /// Network failure that may succeed when retried
    #[error("transient network failure: {0}")]
    TransientNetwork(String),

    /// Hosting service returned data we could not parse
    #[error("malformed hosting response: {0}")]
    MalformedHostingResponse(String),

    /// A git command failed
    #[error("git error: {0}")]
    Git(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform error (used by test doubles and remote detection)
    #[error("platform error: {0}")]
    Platform(String),

    /// Configuration could not be read or written
    #[error("config error: {0}")]
    Config(String),

    /// A stack violates one of its structural invariants
    #[error("invalid stack: {0}")]
    InvalidStack(String),

    /// A cascade is already running for this stack
    #[error("a sync is already in progress for stack '{0}'")]
    CascadeInProgress(String),

    /// Another stackboi process holds the repository's sync lock
    #[error("another sync is running in this repository (remove {path} if it is not)")]
    SyncLocked {
        /// Lock file path
        path: String,
    },

    /// A cascade stopped before every child was rebased
    #[error("sync of '{branch}' halted: {reason}")]
    CascadeHalted {
        /// Merged branch the cascade was syncing
        branch: String,
        /// What stopped it
        reason: String,
    },

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure is worth a single retry
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }

    /// Whether the failure should abort the current command without retry
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotARepository
                | Self::NotAuthenticated(_)
                | Self::BranchNotInAnyStack(_)
                | Self::BranchIsBaseBranch(_)
        )
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code;
                if status.as_u16() == 401 {
                    Self::NotAuthenticated(source.message.clone())
                } else if status.is_server_error() || status.as_u16() == 429 {
                    Self::TransientNetwork(format!("{status}: {}", source.message))
                } else {
                    Self::GitHubApi(format!("{status}: {}", source.message))
                }
            }
            octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => {
                Self::MalformedHostingResponse(err.to_string())
            }
            octocrab::Error::Hyper { .. } | octocrab::Error::Service { .. } => {
                Self::TransientNetwork(err.to_string())
            }
            _ => Self::GitHubApi(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedHostingResponse(err.to_string())
    }
}
