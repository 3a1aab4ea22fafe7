//! Backport request - the immutable input of one cherry-pick run

use crate::backport::targets::is_backport_label;
use crate::error::{Error, Result};
use crate::types::{Branch, MergeBase, PullRequestDetails};
use chrono::{DateTime, Utc};

/// Everything needed to replay a merged PR onto one target branch
#[derive(Debug, Clone)]
pub struct BackportRequest {
    /// Source PR number
    pub pr_number: u64,
    /// Source commits in replay order
    pub source_shas: Vec<String>,
    /// Single commit used when `source_shas` is empty
    pub source_sha: String,
    /// When the source PR was merged
    pub source_commit_date: Option<DateTime<Utc>>,
    /// Source PR title
    pub source_title: String,
    /// Source PR body
    pub source_body: Option<String>,
    /// Branch to backport onto
    pub target: Branch,
    /// Labels to put on the backport PR
    pub labels: Vec<String>,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Merge base of the target and the source base, if it could be found
    pub merge_base: Option<MergeBase>,
}

impl BackportRequest {
    /// Build a request for `target` from the source PR and its commits
    ///
    /// The fallback SHA is the PR's merge commit, or the last listed commit
    /// when the merge commit is unknown. Backport directive labels are not
    /// carried over to the new PR; `extra_labels` come first.
    pub fn from_pr(
        details: &PullRequestDetails,
        commits: &[String],
        target: Branch,
        merge_base: Option<MergeBase>,
        extra_labels: &[String],
        owner: &str,
        repo: &str,
    ) -> Self {
        let source_shas: Vec<String> = commits.iter().filter(|s| !s.is_empty()).cloned().collect();
        let source_sha = details
            .merge_commit_sha
            .clone()
            .or_else(|| source_shas.last().cloned())
            .unwrap_or_default();

        let mut labels: Vec<String> = extra_labels.to_vec();
        for label in &details.labels {
            if !is_backport_label(label) && !labels.contains(label) {
                labels.push(label.clone());
            }
        }

        Self {
            pr_number: details.number,
            source_shas,
            source_sha,
            source_commit_date: details.merged_at,
            source_title: details.title.clone(),
            source_body: details.body.clone(),
            target,
            labels,
            owner: owner.to_string(),
            repo: repo.to_string(),
            merge_base,
        }
    }

    /// The commits to replay, in order
    ///
    /// Uses the ordered list when non-empty, else the single fallback SHA.
    pub fn effective_shas(&self) -> Result<Vec<&str>> {
        if !self.source_shas.is_empty() {
            return Ok(self.source_shas.iter().map(String::as_str).collect());
        }

        let fallback = self.source_sha.trim();
        if fallback.is_empty() {
            return Err(Error::NoSourceCommits);
        }
        Ok(vec![fallback])
    }

    /// Name of the local branch the backport is built on
    pub fn branch_name(&self) -> String {
        format!("backport-{}-to-{}", self.pr_number, self.target.name)
    }

    /// Title of the backport PR
    pub fn pr_title(&self) -> String {
        format!("[{}] {}", self.target.name, self.source_title)
    }

    /// Body of the backport PR
    pub fn pr_body(&self) -> String {
        let commits = self
            .effective_shas()
            .map(|shas| shas.join(", "))
            .unwrap_or_default();
        let mut body = format!(
            "Backport {commits} from #{}\n\nTarget branch: `{}`",
            self.pr_number, self.target.name
        );
        if let Some(source_body) = self.source_body.as_deref().filter(|b| !b.trim().is_empty()) {
            body.push_str("\n\n---\n\n");
            body.push_str(source_body);
        }
        body
    }
}
