//! Shared test utilities

#![allow(dead_code, unused_imports)]

mod mock_platform;
mod mock_vcs;
mod temp_repo;

pub use mock_platform::{
    CreatePrCall, EnsureLabelCall, MockPlatformService, github_config, make_pr,
};
pub use mock_vcs::{MockVcs, RebaseCall};
pub use temp_repo::TempGitRepo;

use stackboi::stack::{Stack, StackboiConfig};

/// Config with one stack `stack-<first>` on `main` holding `branches` in order
pub fn make_config(branches: &[&str]) -> StackboiConfig {
    let mut config = StackboiConfig::new();
    config.stacks.push(make_stack(branches));
    config
}

/// Stack `stack-<first>` on `main`
pub fn make_stack(branches: &[&str]) -> Stack {
    Stack {
        name: format!("stack-{}", branches.first().copied().unwrap_or("empty")),
        base_branch: "main".to_string(),
        branches: branches.iter().map(|b| (*b).to_string()).collect(),
    }
}

/// Mock repo containing `main` plus `branches`, all pushed
pub fn make_repo(branches: &[&str]) -> MockVcs {
    let mut all = vec!["main"];
    all.extend_from_slice(branches);
    let vcs = MockVcs::with_branches(&all);
    vcs.push_all(&all);
    vcs
}

/// Mock platform for `test/repo`
pub fn make_platform() -> MockPlatformService {
    MockPlatformService::with_config(github_config())
}
