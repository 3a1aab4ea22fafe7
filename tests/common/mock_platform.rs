//! Mock GitHub platform for orchestration tests
//!
//! Serves canned PR data and branch pages, records every write, and fails
//! individual operations on request.

#![allow(dead_code)]

use async_trait::async_trait;
use backport::error::{Error, Result};
use backport::platform::PlatformService;
use backport::types::{
    Branch, BranchPage, MergeBase, PlatformConfig, PullRequest, PullRequestDetails,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
}

/// Call record for `create_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `add_labels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLabelsCall {
    pub pr_number: u64,
    pub labels: Vec<String>,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Paged branch listing that mimics GitHub's 1-based pages
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    pr_details_responses: Mutex<HashMap<u64, PullRequestDetails>>,
    pr_commits_responses: Mutex<HashMap<u64, Vec<String>>>,
    branch_pages: Mutex<Vec<Vec<Branch>>>,
    merge_bases: Mutex<HashMap<String, MergeBase>>,
    // Call tracking
    branch_page_calls: Mutex<Vec<u32>>,
    merge_base_calls: Mutex<Vec<(String, String)>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    create_comment_calls: Mutex<Vec<CreateCommentCall>>,
    add_labels_calls: Mutex<Vec<AddLabelsCall>>,
    // Error injection
    error_on_list_commits: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
    error_on_add_labels: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(100),
            pr_details_responses: Mutex::new(HashMap::new()),
            pr_commits_responses: Mutex::new(HashMap::new()),
            branch_pages: Mutex::new(Vec::new()),
            merge_bases: Mutex::new(HashMap::new()),
            branch_page_calls: Mutex::new(Vec::new()),
            merge_base_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            create_comment_calls: Mutex::new(Vec::new()),
            add_labels_calls: Mutex::new(Vec::new()),
            error_on_list_commits: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
            error_on_comment: Mutex::new(None),
            error_on_add_labels: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `list_pr_commits` return an error
    pub fn fail_list_commits(&self, msg: &str) {
        *self.error_on_list_commits.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_comment` return an error
    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `add_labels` return an error
    pub fn fail_add_labels(&self, msg: &str) {
        *self.error_on_add_labels.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Set the response for `get_pr_details`
    pub fn set_pr_details(&self, details: PullRequestDetails) {
        self.pr_details_responses
            .lock()
            .unwrap()
            .insert(details.number, details);
    }

    /// Set the response for `list_pr_commits`
    pub fn set_pr_commits(&self, pr_number: u64, shas: &[&str]) {
        self.pr_commits_responses
            .lock()
            .unwrap()
            .insert(pr_number, shas.iter().map(ToString::to_string).collect());
    }

    /// Serve `names` as a single page of branches
    pub fn set_branches(&self, names: &[&str]) {
        self.set_branch_pages(&[names]);
    }

    /// Serve branches split over several pages
    pub fn set_branch_pages(&self, pages: &[&[&str]]) {
        *self.branch_pages.lock().unwrap() = pages
            .iter()
            .map(|names| {
                names
                    .iter()
                    .map(|n| Branch::new(*n, format!("sha-{n}")))
                    .collect()
            })
            .collect();
    }

    /// Set the merge base returned for a target branch
    pub fn set_merge_base(&self, target: &str, merge_base: MergeBase) {
        self.merge_bases
            .lock()
            .unwrap()
            .insert(target.to_string(), merge_base);
    }

    // === Call verification methods ===

    /// Pages requested from `list_branches_page`, in order
    pub fn get_branch_page_calls(&self) -> Vec<u32> {
        self.branch_page_calls.lock().unwrap().clone()
    }

    /// Get all `merge_base` calls as (base, head)
    pub fn get_merge_base_calls(&self) -> Vec<(String, String)> {
        self.merge_base_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr_comment` calls
    pub fn get_create_comment_calls(&self) -> Vec<CreateCommentCall> {
        self.create_comment_calls.lock().unwrap().clone()
    }

    /// Get all `add_labels` calls
    pub fn get_add_labels_calls(&self) -> Vec<AddLabelsCall> {
        self.add_labels_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        let responses = self.pr_details_responses.lock().unwrap();
        responses.get(&pr_number).cloned().ok_or_else(|| {
            Error::GitHubApi(format!(
                "get_pr_details: no response configured for PR #{pr_number}"
            ))
        })
    }

    async fn list_pr_commits(&self, pr_number: u64, per_page: u32) -> Result<Vec<String>> {
        if let Some(msg) = self.error_on_list_commits.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let responses = self.pr_commits_responses.lock().unwrap();
        let mut commits = responses.get(&pr_number).cloned().unwrap_or_default();
        commits.truncate(per_page as usize);
        Ok(commits)
    }

    async fn list_branches_page(&self, page: u32, _per_page: u32) -> Result<BranchPage> {
        self.branch_page_calls.lock().unwrap().push(page);

        // GitHub treats page 0 like page 1
        let index = page.max(1) as usize - 1;
        let pages = self.branch_pages.lock().unwrap();
        let branches = pages.get(index).cloned().unwrap_or_default();
        let next_page = if index + 1 < pages.len() {
            u32::try_from(index + 2).unwrap()
        } else {
            0
        };
        Ok(BranchPage {
            branches,
            next_page,
        })
    }

    async fn merge_base(&self, base: &str, head: &str) -> Result<MergeBase> {
        self.merge_base_calls
            .lock()
            .unwrap()
            .push((base.to_string(), head.to_string()));

        let bases = self.merge_bases.lock().unwrap();
        bases.get(base).cloned().ok_or_else(|| {
            Error::GitHubApi(format!("merge_base: no response configured for {base}"))
        })
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
        })
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.create_comment_calls
            .lock()
            .unwrap()
            .push(CreateCommentCall {
                pr_number,
                body: body.to_string(),
            });

        if let Some(msg) = self.error_on_comment.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()> {
        self.add_labels_calls.lock().unwrap().push(AddLabelsCall {
            pr_number,
            labels: labels.to_vec(),
        });

        if let Some(msg) = self.error_on_add_labels.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
