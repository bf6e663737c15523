//! Stack model
//!
//! A stack is a base branch plus an ordered chain of dependent branches:
//! `branches[0]` was forked from `base_branch`, `branches[i]` from
//! `branches[i - 1]`. Everything here is pure lookups and edits over that
//! ordering; no git or network I/O happens in this module.

use crate::config::Settings;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current version of the persisted config format.
pub const CONFIG_VERSION: u32 = 1;

/// A base branch and its chain of dependent branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    /// Stack name (e.g. `stack-feature`)
    pub name: String,
    /// Root branch the first member was forked from. Never a member.
    pub base_branch: String,
    /// Members in dependency order (oldest first)
    pub branches: Vec<String>,
}

impl Stack {
    /// Create a stack with a single member
    pub fn new(
        name: impl Into<String>,
        base_branch: impl Into<String>,
        first: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_branch: base_branch.into(),
            branches: vec![first.into()],
        }
    }

    /// Whether `branch` is a member (the base branch is not)
    pub fn contains(&self, branch: &str) -> bool {
        self.index_of(branch).is_some()
    }

    /// Zero-based index of a member
    pub fn index_of(&self, branch: &str) -> Option<usize> {
        self.branches.iter().position(|b| b == branch)
    }

    /// 1-indexed position of a member and the stack size
    pub fn position(&self, branch: &str) -> Option<(usize, usize)> {
        self.index_of(branch).map(|i| (i + 1, self.branches.len()))
    }

    /// The branch a member was forked from
    pub fn parent_of(&self, branch: &str) -> Option<&str> {
        match self.index_of(branch)? {
            0 => Some(self.base_branch.as_str()),
            i => Some(self.branches[i - 1].as_str()),
        }
    }

    /// Members stacked on top of `branch`, oldest first. Empty for the tip or a
    /// non-member.
    pub fn children_of(&self, branch: &str) -> &[String] {
        self.index_of(branch)
            .map_or(&[], |i| &self.branches[i + 1..])
    }

    /// The top-most member
    pub fn tip(&self) -> Option<&str> {
        self.branches.last().map(String::as_str)
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<()> {
        if self.branches.iter().any(|b| *b == self.base_branch) {
            return Err(Error::InvalidStack(format!(
                "stack '{}' lists its base branch '{}' as a member",
                self.name, self.base_branch
            )));
        }
        let mut seen = HashSet::new();
        for branch in &self.branches {
            if !seen.insert(branch.as_str()) {
                return Err(Error::InvalidStack(format!(
                    "stack '{}' contains '{branch}' more than once",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// The persisted document: all stacks plus user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackboiConfig {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Tracked stacks
    #[serde(default)]
    pub stacks: Vec<Stack>,
    /// User settings
    #[serde(default)]
    pub settings: Settings,
}

const fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for StackboiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StackboiConfig {
    /// Empty config with default settings
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            stacks: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Find the stack a branch belongs to, either as a member or as its base
    pub fn find_stack_by_branch(&self, branch: &str) -> Option<&Stack> {
        self.stacks
            .iter()
            .find(|s| s.contains(branch))
            .or_else(|| self.stacks.iter().find(|s| s.base_branch == branch))
    }

    /// Find the stack a branch is a *member* of.
    ///
    /// Distinguishes a base branch (`BranchIsBaseBranch`) from an untracked
    /// one (`BranchNotInAnyStack`).
    pub fn locate_branch(&self, branch: &str) -> Result<&Stack> {
        match self.find_stack_by_branch(branch) {
            Some(stack) if stack.contains(branch) => Ok(stack),
            Some(_) => Err(Error::BranchIsBaseBranch(branch.to_string())),
            None => Err(Error::BranchNotInAnyStack(branch.to_string())),
        }
    }

    /// Look up a stack by name
    pub fn stack_named(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name == name)
    }

    /// Track `branch` as forked from `parent`.
    ///
    /// If `parent` is the tip of an existing stack the branch is appended to
    /// it; otherwise a new stack rooted at `parent` is created. Returns the
    /// name of the stack the branch landed in.
    pub fn add_branch(&mut self, parent: &str, branch: &str) -> Result<String> {
        if branch == parent {
            return Err(Error::InvalidStack(format!(
                "branch '{branch}' cannot be stacked on itself"
            )));
        }
        if let Some(existing) = self.stacks.iter().find(|s| s.contains(branch)) {
            return Err(Error::InvalidStack(format!(
                "branch '{branch}' is already tracked in stack '{}'",
                existing.name
            )));
        }
        if self.stacks.iter().any(|s| s.base_branch == branch) {
            return Err(Error::BranchIsBaseBranch(branch.to_string()));
        }

        if let Some(stack) = self
            .stacks
            .iter_mut()
            .find(|s| s.tip() == Some(parent))
        {
            stack.branches.push(branch.to_string());
            return Ok(stack.name.clone());
        }

        if self.stacks.iter().any(|s| s.contains(parent)) {
            return Err(Error::InvalidStack(format!(
                "'{parent}' is in the middle of a stack; only the tip can be extended"
            )));
        }

        let name = self.unused_stack_name(branch);
        let stack = Stack::new(name.clone(), parent, branch);
        self.stacks.push(stack);
        Ok(name)
    }

    /// `stack-<branch>`, or `stack-<branch>-<n>` if that name is taken
    fn unused_stack_name(&self, branch: &str) -> String {
        let base = format!("stack-{branch}");
        let taken = |name: &str| self.stacks.iter().any(|s| s.name == name);
        if !taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let name = format!("{base}-{n}");
            if !taken(&name) {
                return name;
            }
            n += 1;
        }
    }

    /// Remove a member branch, shifting later members up one position.
    ///
    /// The stack itself is dropped once its last member is gone. Returns the
    /// stack as it looks after removal.
    pub fn remove_branch(&mut self, branch: &str) -> Result<Stack> {
        let idx = self
            .stacks
            .iter()
            .position(|s| s.contains(branch))
            .ok_or_else(|| {
                if self.stacks.iter().any(|s| s.base_branch == branch) {
                    Error::BranchIsBaseBranch(branch.to_string())
                } else {
                    Error::BranchNotInAnyStack(branch.to_string())
                }
            })?;

        let stack = &mut self.stacks[idx];
        stack.branches.retain(|b| b != branch);
        let after = stack.clone();
        if after.branches.is_empty() {
            self.stacks.remove(idx);
        }
        Ok(after)
    }

    /// Validate every stack and check no branch or stack name is used twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut names = HashSet::new();
        for stack in &self.stacks {
            stack.validate()?;
            if !names.insert(stack.name.as_str()) {
                return Err(Error::InvalidStack(format!(
                    "stack name '{}' is used more than once",
                    stack.name
                )));
            }
            for branch in &stack.branches {
                if !seen.insert(branch.as_str()) {
                    return Err(Error::InvalidStack(format!(
                        "branch '{branch}' is tracked by more than one stack"
                    )));
                }
            }
        }
        Ok(())
    }
}
