//! Backport orchestration
//!
//! Two phases, matching the rest of the crate:
//! 1. Plan - gather PR metadata and branches, resolve targets (no working tree changes)
//! 2. Execute - per target: cherry-pick, push, open the PR (effectful)
//!
//! Targets are processed one at a time. A failing target is reported on the
//! source PR and recorded, and the next target still runs.

use crate::backport::cherry_pick::{CherryPickOptions, create_cherry_pick_branch};
use crate::backport::conflict::ConflictResolver;
use crate::backport::progress::ProgressCallback;
use crate::backport::request::BackportRequest;
use crate::backport::targets::resolve_targets;
use crate::config::BackportConfig;
use crate::error::{Error, Result};
use crate::platform::{PlatformService, list_all_branches};
use crate::runner::CommandRunner;
use crate::types::{Branch, PullRequest, PullRequestDetails};
use tracing::{info, warn};

/// Options for planning and executing a backport
#[derive(Debug, Clone)]
pub struct BackportOptions {
    /// Source PR number
    pub pr_number: u64,
    /// When set, targets are resolved from this label only
    pub label: Option<String>,
    /// Labels added to every backport PR
    pub labels_to_add: Vec<String>,
    /// Page size for branch listing
    pub branch_page_size: u32,
    /// Maximum number of PR commits to replay
    pub commit_page_size: u32,
    /// Git settings for the cherry-pick engine
    pub cherry_pick: CherryPickOptions,
}

impl From<&BackportConfig> for BackportOptions {
    fn from(config: &BackportConfig) -> Self {
        Self {
            pr_number: config.pr_number,
            label: config.label.clone(),
            labels_to_add: config.labels_to_add.clone(),
            branch_page_size: config.branch_page_size,
            commit_page_size: config.commit_page_size,
            cherry_pick: CherryPickOptions {
                remote: config.remote.clone(),
                fallback_fetch_depth: config.fallback_fetch_depth,
            },
        }
    }
}

/// Resolved backport plan for a source PR
#[derive(Debug, Clone)]
pub struct BackportPlan {
    /// Source PR details
    pub details: PullRequestDetails,
    /// Source commits in replay order
    pub commits: Vec<String>,
    /// The commit list filled a whole page, so later commits may be missing
    pub commits_truncated: bool,
    /// Branches to backport onto, in label order
    pub targets: Vec<Branch>,
}

/// A target whose backport failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    /// Target branch name
    pub target: String,
    /// Error message
    pub error: String,
}

/// Result of backport execution
#[derive(Debug, Clone, Default)]
pub struct BackportExecutionResult {
    /// Backport PRs that were opened, keyed by target branch
    pub created_prs: Vec<(String, PullRequest)>,
    /// Targets that could not be backported
    pub failures: Vec<TargetFailure>,
}

impl BackportExecutionResult {
    /// Check if every target was backported
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Gather PR data and resolve targets
///
/// Resolution errors (`NotMerged`, `NoLabels`, `NoBranchFound`) are returned
/// before any target is touched.
pub async fn plan_backport(
    platform: &dyn PlatformService,
    options: &BackportOptions,
) -> Result<BackportPlan> {
    let details = platform.get_pr_details(options.pr_number).await?;

    let branches = list_all_branches(platform, options.branch_page_size).await?;

    let labels: Vec<String> = match &options.label {
        Some(label) => vec![label.clone()],
        None => details.labels.clone(),
    };
    let targets = resolve_targets(details.merged, &labels, &branches)?;

    let commits = match platform
        .list_pr_commits(options.pr_number, options.commit_page_size)
        .await
    {
        Ok(commits) => commits,
        Err(e) => {
            warn!(
                pr_number = options.pr_number,
                error = %e,
                "error listing PR commits, using merge commit"
            );
            Vec::new()
        }
    };
    let commits_truncated = commits.len() >= options.commit_page_size as usize;
    if commits_truncated {
        warn!(
            pr_number = options.pr_number,
            limit = options.commit_page_size,
            "PR commit list hit the page size, later commits will not be backported"
        );
    }

    Ok(BackportPlan {
        details,
        commits,
        commits_truncated,
        targets,
    })
}

/// Backport the plan's source PR onto every target, one at a time
pub async fn execute_backport(
    plan: &BackportPlan,
    platform: &dyn PlatformService,
    runner: &dyn CommandRunner,
    resolvers: &[Box<dyn ConflictResolver>],
    progress: &dyn ProgressCallback,
    options: &BackportOptions,
) -> BackportExecutionResult {
    let mut result = BackportExecutionResult::default();
    let config = platform.config();

    for target in &plan.targets {
        progress
            .on_message(&format!(
                "Backporting #{} to {}",
                plan.details.number, target.name
            ))
            .await;

        let merge_base = match platform
            .merge_base(&target.name, &plan.details.base_ref)
            .await
        {
            Ok(merge_base) => Some(merge_base),
            Err(e) => {
                warn!(branch = %target.name, error = %e, "error finding merge-base");
                None
            }
        };

        let request = BackportRequest::from_pr(
            &plan.details,
            &plan.commits,
            target.clone(),
            merge_base,
            &options.labels_to_add,
            &config.owner,
            &config.repo,
        );

        match backport_one(&request, platform, runner, resolvers, progress, options).await {
            Ok(pr) => {
                info!(branch = %target.name, url = %pr.html_url, "backport successful");
                progress
                    .on_message(&format!("Opened #{} for {}", pr.number, target.name))
                    .await;
                result.created_prs.push((target.name.clone(), pr));
            }
            Err(e) => {
                warn!(branch = %target.name, error = %e, "backport failed");
                progress
                    .on_warning(&format!("Backport to {} failed: {e}", target.name))
                    .await;
                report_failure(platform, &request, &options.cherry_pick.remote, &e).await;
                result.failures.push(TargetFailure {
                    target: target.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    result
}

async fn backport_one(
    request: &BackportRequest,
    platform: &dyn PlatformService,
    runner: &dyn CommandRunner,
    resolvers: &[Box<dyn ConflictResolver>],
    progress: &dyn ProgressCallback,
    options: &BackportOptions,
) -> Result<PullRequest> {
    let branch = request.branch_name();

    create_cherry_pick_branch(
        runner,
        resolvers,
        progress,
        &branch,
        request,
        &options.cherry_pick,
    )
    .await?;

    runner
        .run("git", &["push", &options.cherry_pick.remote, &branch])
        .await
        .map_err(|source| Error::Push {
            branch: branch.clone(),
            source,
        })?;

    let body = request.pr_body();
    let pr = platform
        .create_pr(
            &branch,
            &request.target.name,
            &request.pr_title(),
            Some(body.as_str()),
        )
        .await?;

    if let Err(e) = platform.add_labels(pr.number, &request.labels).await {
        warn!(pr_number = pr.number, error = %e, "error adding labels to backport PR");
    }

    Ok(pr)
}

/// Tell the source PR that a target failed, with manual instructions
async fn report_failure(
    platform: &dyn PlatformService,
    request: &BackportRequest,
    remote: &str,
    error: &Error,
) {
    let body = failure_comment(request, remote, error);
    if let Err(e) = platform.create_pr_comment(request.pr_number, &body).await {
        warn!(pr_number = request.pr_number, error = %e, "error commenting on source PR");
    }
}

/// Comment posted on the source PR when a backport fails
pub fn failure_comment(request: &BackportRequest, remote: &str, error: &Error) -> String {
    let target = &request.target.name;
    let shas = request
        .effective_shas()
        .map(|shas| shas.join(" "))
        .unwrap_or_default();

    format!(
        "The backport to `{target}` failed:\n\n```\n{error}\n```\n\n\
         To backport manually, run these commands in your terminal:\n\n\
         ```bash\n\
         git fetch {remote}\n\
         git switch --create {branch} {remote}/{target}\n\
         git cherry-pick -x {shas}\n\
         ```\n\n\
         Then push the branch and open a pull request against `{target}`.",
        branch = request.branch_name(),
    )
}
