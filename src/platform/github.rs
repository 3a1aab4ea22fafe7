//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    Branch, BranchPage, MergeBase, PlatformConfig, PullRequest, PullRequestDetails,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::Client;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Public GitHub REST endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

// REST response types for endpoints read with raw requests

#[derive(Deserialize)]
struct RestBranch {
    name: String,
    commit: RestCommitRef,
}

#[derive(Deserialize)]
struct RestCommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct Comparison {
    merge_base_commit: ComparedCommit,
}

#[derive(Deserialize)]
struct ComparedCommit {
    sha: String,
    commit: ComparedCommitDetail,
}

#[derive(Deserialize)]
struct ComparedCommitDetail {
    committer: Option<GitActor>,
}

#[derive(Deserialize)]
struct GitActor {
    date: Option<DateTime<Utc>>,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (branches, commits, comparisons)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// REST base URL for raw requests, without a trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service for github.com
    pub fn new(token: &str, owner: String, repo: String) -> Result<Self> {
        Self::with_api_base(token, owner, repo, DEFAULT_API_BASE)
    }

    /// Create a new GitHub service against a specific REST base URL
    ///
    /// Used for GitHub Enterprise (`GITHUB_API_URL`).
    pub fn with_api_base(token: &str, owner: String, repo: String, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if api_base != DEFAULT_API_BASE {
            builder = builder
                .base_uri(api_base.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("backport")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo },
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{path}",
            self.api_base, self.config.owner, self.config.repo
        )
    }

    /// Send an authenticated GET and return the successful response
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!("GET {url} returned {status}: {body}")));
        }
        Ok(response)
    }
}

/// Extract the `page` parameter of the `rel="next"` entry of a Link header
///
/// Returns 0 when there is no next page.
fn next_page(headers: &HeaderMap) -> u32 {
    let Some(link) = headers.get(LINK).and_then(|v| v.to_str().ok()) else {
        return 0;
    };

    link.split(',')
        .filter_map(|entry| {
            let (target, params) = entry.split_once(';')?;
            let is_next = params
                .split(';')
                .any(|p| p.trim() == r#"rel="next""#);
            is_next.then(|| target.trim().trim_start_matches('<').trim_end_matches('>'))
        })
        .filter_map(|target| Url::parse(target).ok())
        .find_map(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
        .unwrap_or(0)
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        debug!(pr_number, "getting PR details");

        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        let details = PullRequestDetails {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            body: pr.body.clone(),
            merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
            merged_at: pr.merged_at,
            merge_commit_sha: pr.merge_commit_sha.clone().filter(|sha| !sha.is_empty()),
            base_ref: pr.base.ref_field.clone(),
            labels: pr
                .labels
                .as_ref()
                .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
                .unwrap_or_default(),
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        };

        debug!(pr_number, merged = details.merged, labels = ?details.labels, "got PR details");
        Ok(details)
    }

    async fn list_pr_commits(&self, pr_number: u64, per_page: u32) -> Result<Vec<String>> {
        debug!(pr_number, per_page, "listing PR commits");

        let url = self.repo_url(&format!("pulls/{pr_number}/commits"));
        let commits: Vec<RestCommitRef> = self
            .get(&url, &[("per_page", per_page.to_string())])
            .await?
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse PR commits: {e}")))?;

        let shas: Vec<String> = commits
            .into_iter()
            .map(|c| c.sha)
            .filter(|sha| !sha.is_empty())
            .collect();
        debug!(pr_number, count = shas.len(), "listed PR commits");
        Ok(shas)
    }

    async fn list_branches_page(&self, page: u32, per_page: u32) -> Result<BranchPage> {
        let url = self.repo_url("branches");
        let response = self
            .get(
                &url,
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;

        let next_page = next_page(response.headers());
        let branches: Vec<RestBranch> = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse branches: {e}")))?;

        Ok(BranchPage {
            branches: branches
                .into_iter()
                .map(|b| Branch::new(b.name, b.commit.sha))
                .collect(),
            next_page,
        })
    }

    async fn merge_base(&self, base: &str, head: &str) -> Result<MergeBase> {
        debug!(base, head, "finding merge base");

        let url = self.repo_url(&format!(
            "compare/{}...{}",
            urlencoding::encode(base),
            urlencoding::encode(head)
        ));
        let comparison: Comparison = self
            .get(&url, &[])
            .await?
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse comparison: {e}")))?;

        let commit = comparison.merge_base_commit;
        let committer_date = commit
            .commit
            .committer
            .and_then(|c| c.date)
            .ok_or_else(|| {
                Error::GitHubApi(format!("merge base {} has no committer date", commit.sha))
            })?;

        debug!(sha = %commit.sha, %committer_date, "found merge base");
        Ok(MergeBase {
            sha: commit.sha,
            committer_date,
        })
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut builder = pulls.create(title, head, base);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, "created PR comment");
        Ok(())
    }

    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        debug!(pr_number, ?labels, "adding labels");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .add_labels(pr_number, labels)
            .await?;
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
