//! In-memory git double for testing
//!
//! Branch tips are plain strings. A rebase moves the branch to
//! `"<branch>@<onto>"` so tests can see what it was replayed onto.

#![allow(dead_code)]

use async_trait::async_trait;
use stackboi::error::{Error, Result};
use stackboi::vcs::{AheadBehind, RebaseOutcome, Vcs};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Call record for `rebase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseCall {
    pub branch: String,
    pub upstream: String,
    pub onto: String,
}

/// Mock git repository
pub struct MockVcs {
    root: PathBuf,
    current: Mutex<String>,
    tips: Mutex<HashMap<String, String>>,
    remote_tips: Mutex<HashMap<String, String>>,
    ahead_behind: Mutex<HashMap<String, AheadBehind>>,
    merge_bases: Mutex<HashMap<(String, String), String>>,
    commits: Mutex<HashMap<(String, String), Vec<String>>>,
    conflicted: Mutex<HashSet<String>>,
    // Scripted behaviour
    conflict_on_rebase: Mutex<HashSet<String>>,
    error_on_rebase: Mutex<HashSet<String>>,
    error_on_fetch: Mutex<Option<String>>,
    error_on_commits: Mutex<bool>,
    // Call tracking
    rebase_calls: Mutex<Vec<RebaseCall>>,
    fetch_calls: Mutex<Vec<Vec<String>>>,
    deleted: Mutex<Vec<String>>,
}

impl MockVcs {
    /// Repository with the given local branches, each at tip `"<name>-tip"`
    pub fn with_branches(branches: &[&str]) -> Self {
        let tips = branches
            .iter()
            .map(|b| ((*b).to_string(), format!("{b}-tip")))
            .collect();
        Self {
            root: PathBuf::from("/mock/repo"),
            current: Mutex::new(branches.first().map_or_else(String::new, |b| (*b).to_string())),
            tips: Mutex::new(tips),
            remote_tips: Mutex::new(HashMap::new()),
            ahead_behind: Mutex::new(HashMap::new()),
            merge_bases: Mutex::new(HashMap::new()),
            commits: Mutex::new(HashMap::new()),
            conflicted: Mutex::new(HashSet::new()),
            conflict_on_rebase: Mutex::new(HashSet::new()),
            error_on_rebase: Mutex::new(HashSet::new()),
            error_on_fetch: Mutex::new(None),
            error_on_commits: Mutex::new(false),
            rebase_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Check out a branch
    pub fn set_current(&self, branch: &str) {
        *self.current.lock().unwrap() = branch.to_string();
    }

    /// Give a branch a remote tracking ref in sync with the local one
    pub fn push(&self, branch: &str) {
        let tip = self.tips.lock().unwrap().get(branch).cloned().unwrap();
        self.remote_tips
            .lock()
            .unwrap()
            .insert(branch.to_string(), tip);
        self.set_ahead_behind(branch, 0, 0);
    }

    /// Give every listed branch an in-sync remote
    pub fn push_all(&self, branches: &[&str]) {
        for branch in branches {
            self.push(branch);
        }
    }

    /// Set the remote tracking tip for a branch
    pub fn set_remote_tip(&self, branch: &str, tip: &str) {
        self.remote_tips
            .lock()
            .unwrap()
            .insert(branch.to_string(), tip.to_string());
    }

    /// Set local-vs-remote commit counts
    pub fn set_ahead_behind(&self, branch: &str, ahead: usize, behind: usize) {
        self.ahead_behind
            .lock()
            .unwrap()
            .insert(branch.to_string(), AheadBehind { ahead, behind });
    }

    /// Make `merge_base(branch, parent)` return something other than the parent tip
    pub fn set_behind_parent(&self, branch: &str, parent: &str) {
        self.merge_bases.lock().unwrap().insert(
            (branch.to_string(), parent.to_string()),
            format!("{parent}-old-tip"),
        );
    }

    /// Record an unresolved conflict on a branch
    pub fn set_conflicted(&self, branch: &str) {
        self.conflicted
            .lock()
            .unwrap()
            .insert(branch.to_string());
    }

    /// Commit subjects between parent and head, oldest first
    pub fn set_commits(&self, parent: &str, head: &str, subjects: &[&str]) {
        self.commits.lock().unwrap().insert(
            (parent.to_string(), head.to_string()),
            subjects.iter().map(|s| (*s).to_string()).collect(),
        );
    }

    /// Make the commit log unreadable
    pub fn fail_commits(&self) {
        *self.error_on_commits.lock().unwrap() = true;
    }

    /// Make the rebase of `branch` stop on conflicts
    pub fn conflict_on(&self, branch: &str) {
        self.conflict_on_rebase
            .lock()
            .unwrap()
            .insert(branch.to_string());
    }

    /// Make the rebase of `branch` fail outright
    pub fn fail_rebase_of(&self, branch: &str) {
        self.error_on_rebase
            .lock()
            .unwrap()
            .insert(branch.to_string());
    }

    /// Make `fetch` fail
    pub fn fail_fetch(&self, msg: &str) {
        *self.error_on_fetch.lock().unwrap() = Some(msg.to_string());
    }

    /// Remove a local branch
    pub fn remove_branch(&self, branch: &str) {
        self.tips.lock().unwrap().remove(branch);
    }

    /// Current tip of a branch
    pub fn tip(&self, branch: &str) -> Option<String> {
        self.tips.lock().unwrap().get(branch).cloned()
    }

    // === Call verification methods ===

    /// Get all `rebase` calls
    pub fn get_rebase_calls(&self) -> Vec<RebaseCall> {
        self.rebase_calls.lock().unwrap().clone()
    }

    /// Branches passed to `rebase`, in call order
    pub fn rebased_branches(&self) -> Vec<String> {
        self.get_rebase_calls()
            .into_iter()
            .map(|c| c.branch)
            .collect()
    }

    /// Get all `fetch` calls
    pub fn get_fetch_calls(&self) -> Vec<Vec<String>> {
        self.fetch_calls.lock().unwrap().clone()
    }

    /// Branches deleted through `delete_branch`
    pub fn get_deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn lookup_tip(&self, branch: &str) -> Result<String> {
        self.tips
            .lock()
            .unwrap()
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::Git(format!("unknown branch '{branch}'")))
    }
}

#[async_trait]
impl Vcs for MockVcs {
    fn repo_root(&self) -> &Path {
        &self.root
    }

    async fn current_branch(&self) -> Result<String> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn commits_between(&self, parent: &str, head: &str) -> Result<Vec<String>> {
        if *self.error_on_commits.lock().unwrap() {
            return Err(Error::Git("bad revision".to_string()));
        }
        Ok(self
            .commits
            .lock()
            .unwrap()
            .get(&(parent.to_string(), head.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        self.lookup_tip(a)?;
        if let Some(base) = self
            .merge_bases
            .lock()
            .unwrap()
            .get(&(a.to_string(), b.to_string()))
        {
            return Ok(base.clone());
        }
        self.lookup_tip(b)
    }

    async fn branch_tip(&self, branch: &str) -> Result<String> {
        self.lookup_tip(branch)
    }

    async fn remote_tracking_tip(&self, branch: &str) -> Result<Option<String>> {
        Ok(self.remote_tips.lock().unwrap().get(branch).cloned())
    }

    async fn ahead_behind(&self, branch: &str) -> Result<AheadBehind> {
        Ok(self
            .ahead_behind
            .lock()
            .unwrap()
            .get(branch)
            .copied()
            .unwrap_or_default())
    }

    async fn has_unresolved_conflicts(&self, branch: &str) -> Result<bool> {
        Ok(self.conflicted.lock().unwrap().contains(branch))
    }

    async fn fetch(&self, refs: &[String]) -> Result<()> {
        self.fetch_calls.lock().unwrap().push(refs.to_vec());
        if let Some(msg) = self.error_on_fetch.lock().unwrap().as_ref() {
            return Err(Error::TransientNetwork(msg.clone()));
        }
        Ok(())
    }

    async fn rebase(&self, branch: &str, upstream: &str, onto: &str) -> Result<RebaseOutcome> {
        self.rebase_calls.lock().unwrap().push(RebaseCall {
            branch: branch.to_string(),
            upstream: upstream.to_string(),
            onto: onto.to_string(),
        });
        self.lookup_tip(branch)?;

        if self.error_on_rebase.lock().unwrap().contains(branch) {
            return Err(Error::Git(format!("rebase of '{branch}' failed")));
        }
        if self.conflict_on_rebase.lock().unwrap().contains(branch) {
            self.set_conflicted(branch);
            return Ok(RebaseOutcome::Conflict);
        }

        self.tips
            .lock()
            .unwrap()
            .insert(branch.to_string(), format!("{branch}@{onto}"));
        Ok(RebaseOutcome::Success)
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.lookup_tip(branch)?;
        self.tips.lock().unwrap().remove(branch);
        self.deleted.lock().unwrap().push(branch.to_string());
        Ok(())
    }
}
