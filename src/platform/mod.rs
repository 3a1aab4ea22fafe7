//! Platform services for GitHub
//!
//! Provides the pull request, branch, and comparison operations the backport
//! needs, behind a trait so orchestration can be tested against a mock.

mod github;

pub use github::{DEFAULT_API_BASE, GitHubService};

use crate::error::Result;
use crate::types::{
    Branch, BranchPage, MergeBase, PlatformConfig, PullRequest, PullRequestDetails,
};
use async_trait::async_trait;
use tracing::debug;

/// Platform service trait for PR operations
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Get source PR details: merge status, labels, base ref, merge commit
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails>;

    /// List the SHAs of the commits in a PR, oldest first
    ///
    /// Only the first `per_page` commits are returned.
    async fn list_pr_commits(&self, pr_number: u64, per_page: u32) -> Result<Vec<String>>;

    /// Fetch one page of the repository's branch listing
    async fn list_branches_page(&self, page: u32, per_page: u32) -> Result<BranchPage>;

    /// Find the merge base of two refs
    async fn merge_base(&self, base: &str, head: &str) -> Result<MergeBase>;

    /// Create a new PR
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Add labels to a PR
    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

/// List every branch by following the server's pagination
///
/// Starts at page 0 and follows the reported next page until it is 0.
/// Branches are returned in page order.
pub async fn list_all_branches(
    platform: &dyn PlatformService,
    per_page: u32,
) -> Result<Vec<Branch>> {
    let mut page = 0;
    let mut branches = Vec::new();

    loop {
        debug!(page, per_page, "listing branches");
        let result = platform.list_branches_page(page, per_page).await?;
        branches.extend(result.branches);
        if result.next_page == 0 {
            break;
        }
        page = result.next_page;
    }

    debug!(count = branches.len(), "listed branches");
    Ok(branches)
}
