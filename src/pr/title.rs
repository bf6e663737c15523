//! PR title derivation

use crate::vcs::Vcs;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Conventional branch prefixes stripped before building a title.
static PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(feature|feat|fix|bugfix|hotfix|chore|refactor|docs|test|ci)/")
        .expect("prefix pattern is valid")
});

/// Separator runs between words in a branch name.
static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]+").expect("separator pattern is valid"));

/// Capitalize the first character and lowercase the rest
fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Build a title from a branch name.
///
/// `feature/add-login` becomes `Add Login`.
pub fn generate_title_from_branch_name(branch: &str) -> String {
    let clean = PREFIX_PATTERN.replace(branch, "");
    let title = WORD_SEPARATOR
        .split(&clean)
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        branch.to_string()
    } else {
        title
    }
}

/// Title for a branch's PR.
///
/// Uses the oldest commit subject on `branch` that is not on `parent`,
/// verbatim. Falls back to [`generate_title_from_branch_name`] when there are
/// no such commits or the log cannot be read.
pub async fn derive_title(vcs: &dyn Vcs, branch: &str, parent: &str) -> String {
    match vcs.commits_between(parent, branch).await {
        Ok(commits) => {
            if let Some(first) = commits.into_iter().find(|c| !c.trim().is_empty()) {
                return first;
            }
            debug!(branch, parent, "no commits on branch; generating title");
        }
        Err(e) => debug!(branch, parent, error = %e, "commit log failed; generating title"),
    }
    generate_title_from_branch_name(branch)
}
