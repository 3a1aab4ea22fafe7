//! Core types for backport

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:v|release-)?(\d+)\.(\d+)(?:\.(\d+|x))?$").expect("valid version regex")
});

/// Version components parsed from a release branch name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchVersion {
    /// Major component
    pub major: String,
    /// Minor component
    pub minor: String,
    /// Patch component (`x` for wildcard branches like `v11.2.x`)
    pub patch: Option<String>,
}

impl BranchVersion {
    /// Parse `v25.08`, `v11.2.x` or `release-11.2.3` style names
    pub fn parse(name: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(name)?;
        Some(Self {
            major: caps[1].to_string(),
            minor: caps[2].to_string(),
            patch: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }
}

/// A remote branch
///
/// Identity is the name; the SHA and version are informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Tip commit SHA
    pub sha: String,
    /// Version components, if the name looks like a release branch
    pub version: Option<BranchVersion>,
}

impl Branch {
    /// Create a branch, deriving version components from the name
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        let name = name.into();
        let version = BranchVersion::parse(&name);
        Self {
            name,
            sha: sha.into(),
            version,
        }
    }

    /// Branch known only by name (resolved target before the tip is known)
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Branch {}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// One page of a paginated branch listing
#[derive(Debug, Clone, Default)]
pub struct BranchPage {
    /// Branches on this page
    pub branches: Vec<Branch>,
    /// Next page as reported by the server, `0` when this is the last page
    pub next_page: u32,
}

/// A pull request created by the backport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// Source PR metadata needed to plan a backport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Whether the PR has been merged
    pub merged: bool,
    /// When the PR was merged
    pub merged_at: Option<DateTime<Utc>>,
    /// SHA of the merge (or squash) commit
    pub merge_commit_sha: Option<String>,
    /// Base branch name
    pub base_ref: String,
    /// Label names, in the order the API returned them
    pub labels: Vec<String>,
    /// Web URL for the PR
    pub html_url: String,
}

/// Common ancestor of a target branch and the source PR's base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeBase {
    /// Merge-base commit SHA
    pub sha: String,
    /// Committer timestamp of the merge-base commit
    pub committer_date: DateTime<Utc>,
}

impl MergeBase {
    /// Committer date at day precision, as accepted by `--shallow-since`
    pub fn shallow_since(&self) -> String {
        self.committer_date.format("%Y-%m-%d").to_string()
    }
}

/// Repository coordinates on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl std::fmt::Display for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
