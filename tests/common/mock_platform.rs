//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use stackboi::error::{Error, Result};
use stackboi::platform::{PlatformService, STACK_LABEL_PREFIX};
use stackboi::types::{NewPullRequest, PlatformConfig, PrStatus, PullRequest};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub draft: bool,
}

/// Call record for `ensure_label`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureLabelCall {
    pub name: String,
    pub description: String,
    pub color: String,
}

/// How `find_pr` should fail
#[derive(Debug, Clone)]
enum FindPrFailure {
    Api(String),
    Malformed(String),
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Created PRs are returned by later `find_pr` calls
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    find_pr_responses: Mutex<HashMap<String, PullRequest>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    ensure_label_calls: Mutex<Vec<EnsureLabelCall>>,
    open_calls: Mutex<Vec<u64>>,
    set_stack_label_calls: Mutex<Vec<(u64, String)>>,
    // Labels currently on each PR
    pr_labels: Mutex<HashMap<u64, Vec<String>>>,
    // Error injection
    error_on_find_pr: Mutex<Option<FindPrFailure>>,
    transient_find_pr_failures: AtomicU32,
    error_on_create_pr: Mutex<Option<String>>,
    raced_pr_number: Mutex<Option<u64>>,
    error_on_ensure_label: Mutex<Option<String>>,
    error_on_set_stack_label: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(1),
            find_pr_responses: Mutex::new(HashMap::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            ensure_label_calls: Mutex::new(Vec::new()),
            open_calls: Mutex::new(Vec::new()),
            set_stack_label_calls: Mutex::new(Vec::new()),
            pr_labels: Mutex::new(HashMap::new()),
            error_on_find_pr: Mutex::new(None),
            transient_find_pr_failures: AtomicU32::new(0),
            error_on_create_pr: Mutex::new(None),
            raced_pr_number: Mutex::new(None),
            error_on_ensure_label: Mutex::new(None),
            error_on_set_stack_label: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make every `find_pr` return an API error
    pub fn fail_find_pr(&self, msg: &str) {
        *self.error_on_find_pr.lock().unwrap() = Some(FindPrFailure::Api(msg.to_string()));
    }

    /// Make every `find_pr` return an unparseable-response error
    pub fn fail_find_pr_malformed(&self, msg: &str) {
        *self.error_on_find_pr.lock().unwrap() = Some(FindPrFailure::Malformed(msg.to_string()));
    }

    /// Make the next `count` `find_pr` calls fail transiently
    pub fn fail_find_pr_transiently(&self, count: u32) {
        self.transient_find_pr_failures
            .store(count, Ordering::SeqCst);
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` lose a race: PR `number` appears for the head branch
    /// and the create is rejected as a duplicate
    pub fn race_create_pr(&self, number: u64) {
        *self.raced_pr_number.lock().unwrap() = Some(number);
    }

    /// Make `ensure_label` return an error
    pub fn fail_ensure_label(&self, msg: &str) {
        *self.error_on_ensure_label.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `set_stack_label` return an error
    pub fn fail_set_stack_label(&self, msg: &str) {
        *self.error_on_set_stack_label.lock().unwrap() = Some(msg.to_string());
    }

    /// Put labels on a PR
    pub fn set_pr_labels(&self, number: u64, labels: &[&str]) {
        self.pr_labels.lock().unwrap().insert(
            number,
            labels.iter().map(|l| (*l).to_string()).collect(),
        );
    }

    /// Set the PR `find_pr` returns for a branch
    pub fn set_find_pr_response(&self, branch: &str, pr: PullRequest) {
        self.find_pr_responses
            .lock()
            .unwrap()
            .insert(branch.to_string(), pr);
    }

    /// Register a PR with the given status for a branch
    pub fn add_pr(&self, branch: &str, number: u64, status: PrStatus) {
        let mut pr = make_pr(number, branch, "main");
        pr.status = status;
        self.set_find_pr_response(branch, pr);
    }

    // === Call verification methods ===

    /// Get all branches that `find_pr` was called with
    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `ensure_label` calls
    pub fn get_ensure_label_calls(&self) -> Vec<EnsureLabelCall> {
        self.ensure_label_calls.lock().unwrap().clone()
    }

    /// Get all `set_stack_label` calls as (PR number, label)
    pub fn get_set_stack_label_calls(&self) -> Vec<(u64, String)> {
        self.set_stack_label_calls.lock().unwrap().clone()
    }

    /// Labels currently on a PR
    pub fn get_pr_labels(&self, number: u64) -> Vec<String> {
        self.pr_labels
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    /// PR numbers opened in the browser
    pub fn get_open_calls(&self) -> Vec<u64> {
        self.open_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that `create_pr` was never called
    pub fn assert_no_create_pr_calls(&self) {
        let calls = self.get_create_pr_calls();
        assert!(calls.is_empty(), "Expected no create_pr calls but got: {calls:?}");
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_pr(&self, branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        let remaining = self.transient_find_pr_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_find_pr_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(Error::TransientNetwork("connection reset".to_string()));
        }

        match self.error_on_find_pr.lock().unwrap().clone() {
            Some(FindPrFailure::Api(msg)) => return Err(Error::GitHubApi(msg)),
            Some(FindPrFailure::Malformed(msg)) => {
                return Err(Error::MalformedHostingResponse(msg));
            }
            None => {}
        }

        Ok(self.find_pr_responses.lock().unwrap().get(branch).cloned())
    }

    async fn create_pr(&self, request: &NewPullRequest) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
            labels: request.labels.clone(),
            draft: request.draft,
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        if let Some(number) = *self.raced_pr_number.lock().unwrap() {
            self.add_pr(&request.head, number, PrStatus::Open);
            return Err(Error::PrAlreadyExists {
                branch: request.head.clone(),
                number,
            });
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let mut pr = make_pr(number, &request.head, &request.base);
        pr.title.clone_from(&request.title);
        pr.status = if request.draft {
            PrStatus::Draft
        } else {
            PrStatus::Open
        };
        self.set_find_pr_response(&request.head, pr.clone());
        self.pr_labels
            .lock()
            .unwrap()
            .insert(number, request.labels.clone());
        Ok(pr)
    }

    async fn ensure_label(&self, name: &str, description: &str, color: &str) -> Result<()> {
        self.ensure_label_calls
            .lock()
            .unwrap()
            .push(EnsureLabelCall {
                name: name.to_string(),
                description: description.to_string(),
                color: color.to_string(),
            });

        if let Some(msg) = self.error_on_ensure_label.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    async fn set_stack_label(&self, pr_number: u64, label: &str) -> Result<()> {
        self.set_stack_label_calls
            .lock()
            .unwrap()
            .push((pr_number, label.to_string()));

        if let Some(msg) = self.error_on_set_stack_label.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let mut labels = self.pr_labels.lock().unwrap();
        let current = labels.entry(pr_number).or_default();
        current.retain(|l| !l.starts_with(STACK_LABEL_PREFIX));
        current.push(label.to_string());
        Ok(())
    }

    async fn open_in_browser(&self, pr: &PullRequest) -> Result<()> {
        self.open_calls.lock().unwrap().push(pr.number);
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// Build an open PR for a branch
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/test/repo/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: format!("PR for {head}"),
        status: PrStatus::Open,
    }
}

/// Platform config for `test/repo` on github.com
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}
