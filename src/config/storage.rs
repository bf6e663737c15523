//! Persistence for stacks in `.git/stackboi/`.

use super::ConfigStore;
use crate::error::{Error, Result};
use crate::stack::{CONFIG_VERSION, StackboiConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for stackboi metadata within the git dir.
const STACKBOI_DIR: &str = "stackboi";

/// Filename for the stacks config.
const CONFIG_FILE: &str = "config.toml";

/// Resolve the git dir, handling worktree indirection.
///
/// In linked worktrees `.git` is a plain file of the form `gitdir: <path>`
/// pointing at the real git dir. Falls back to `<root>/.git` if the pointer
/// cannot be followed.
pub(super) fn resolve_git_dir(repo_root: &Path) -> PathBuf {
    let git_path = repo_root.join(".git");

    if git_path.is_file() {
        if let Ok(contents) = fs::read_to_string(&git_path)
            && let Some(target) = contents.trim().strip_prefix("gitdir:")
        {
            let target = PathBuf::from(target.trim());
            let target = if target.is_relative() {
                repo_root.join(target)
            } else {
                target
            };
            if target.is_dir() {
                return fs::canonicalize(&target).unwrap_or(target);
            }
        }
        // Pointer file exists but is invalid/unreadable - return as-is to surface error
        return git_path;
    }

    git_path
}

/// Get path to the stackboi metadata directory.
pub(super) fn stackboi_dir(repo_root: &Path) -> PathBuf {
    resolve_git_dir(repo_root).join(STACKBOI_DIR)
}

/// Get path to the config file.
pub fn config_path(repo_root: &Path) -> PathBuf {
    stackboi_dir(repo_root).join(CONFIG_FILE)
}

/// Load config from disk.
///
/// Returns an empty `StackboiConfig` if the file doesn't exist.
pub fn load_config(repo_root: &Path) -> Result<StackboiConfig> {
    let path = config_path(repo_root);

    if !path.exists() {
        return Ok(StackboiConfig::new());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: StackboiConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    config.validate()?;
    Ok(config)
}

/// Save config to disk.
///
/// Creates the `.git/stackboi/` directory if it doesn't exist.
pub fn save_config(repo_root: &Path, config: &StackboiConfig) -> Result<()> {
    let dir = stackboi_dir(repo_root);
    let path = dir.join(CONFIG_FILE);

    if !dir.exists() {
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
    }

    let mut to_save = config.clone();
    to_save.version = CONFIG_VERSION;

    let content = toml::to_string_pretty(&to_save)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

    let content_with_header = format!(
        "# stackboi stacks\n# Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    fs::write(&path, content_with_header)
        .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}

/// `ConfigStore` backed by the config file of one repository
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    repo_root: PathBuf,
}

impl FileConfigStore {
    /// Store for the repository at `repo_root`
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load_config(&self) -> Result<StackboiConfig> {
        load_config(&self.repo_root)
    }

    fn save_config(&self, config: &StackboiConfig) -> Result<()> {
        save_config(&self.repo_root, config)
    }
}
