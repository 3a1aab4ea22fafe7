//! Cherry-pick engine
//!
//! Replays the source commits of a [`BackportRequest`] onto a fresh branch cut
//! from the target. Steps run strictly in order against the shared working
//! tree:
//! 1. Validate - settle the commit list
//! 2. Fetch sources, target, and enough history to cherry-pick
//! 3. Create the branch
//! 4. Replay each commit, handing conflicts to the resolvers
//!
//! Runs for different targets must not overlap: each one checks out a branch
//! in the same working tree.

use crate::backport::conflict::{ConflictResolver, resolve_conflict};
use crate::backport::progress::ProgressCallback;
use crate::backport::request::BackportRequest;
use crate::config::{DEFAULT_FALLBACK_FETCH_DEPTH, DEFAULT_REMOTE};
use crate::error::{Error, Result};
use crate::runner::CommandRunner;
use tracing::{debug, warn};

/// Git settings for a cherry-pick run
#[derive(Debug, Clone)]
pub struct CherryPickOptions {
    /// Remote to fetch from
    pub remote: String,
    /// History depth fetched when the request has no merge base
    pub fallback_fetch_depth: u32,
}

impl Default for CherryPickOptions {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            fallback_fetch_depth: DEFAULT_FALLBACK_FETCH_DEPTH,
        }
    }
}

/// Create `branch` from the target and replay the request's commits onto it
///
/// The run is all-or-nothing from the caller's point of view: it returns
/// `Ok(())` only after every commit has been applied. A cherry-pick that no
/// resolver can settle is aborted before the error is returned.
pub async fn create_cherry_pick_branch(
    runner: &dyn CommandRunner,
    resolvers: &[Box<dyn ConflictResolver>],
    progress: &dyn ProgressCallback,
    branch: &str,
    request: &BackportRequest,
    options: &CherryPickOptions,
) -> Result<()> {
    let shas = request.effective_shas()?;
    let remote = options.remote.as_str();
    let target = request.target.name.as_str();

    // Make the source commits available locally
    for &sha in &shas {
        debug!(sha, "fetching source commit");
        runner
            .run("git", &["fetch", remote, sha])
            .await
            .map_err(|source| Error::FetchSource {
                sha: sha.to_string(),
                source,
            })?;
    }

    let tracking_ref = format!("{target}:refs/remotes/{remote}/{target}");
    runner
        .run("git", &["fetch", remote, &tracking_ref])
        .await
        .map_err(|source| Error::FetchTarget {
            branch: target.to_string(),
            source,
        })?;

    // Enough ancestry for the cherry-pick graph without fetching everything
    let history_arg = match &request.merge_base {
        Some(merge_base) => format!("--shallow-since={}", merge_base.shallow_since()),
        None => {
            warn!(
                branch = target,
                depth = options.fallback_fetch_depth,
                "no merge base, fetching fixed depth"
            );
            format!("--depth={}", options.fallback_fetch_depth)
        }
    };
    runner
        .run("git", &["fetch", &history_arg, remote])
        .await
        .map_err(|source| Error::FetchHistory { source })?;

    let start_point = format!("{remote}/{target}");
    runner
        .run("git", &["checkout", "-b", branch, &start_point])
        .await
        .map_err(|source| Error::CreateBranch {
            branch: branch.to_string(),
            source,
        })?;
    progress
        .on_message(&format!("Created {branch} from {start_point}"))
        .await;

    for &sha in &shas {
        let Err(source) = runner.run("git", &["cherry-pick", "-x", sha]).await else {
            progress.on_message(&format!("Cherry-picked {sha}")).await;
            continue;
        };

        debug!(sha, error = %source, "cherry-pick failed, trying conflict resolvers");
        match resolve_conflict(resolvers, runner).await {
            Ok(signature) => {
                progress
                    .on_message(&format!("Cherry-picked {sha} (resolved {signature})"))
                    .await;
            }
            Err(reason) => {
                debug!(sha, %reason, "conflict not resolved, aborting cherry-pick");
                if let Err(e) = runner.run("git", &["cherry-pick", "--abort"]).await {
                    warn!(sha, error = %e, "cherry-pick abort failed");
                }
                return Err(Error::CherryPick {
                    sha: sha.to_string(),
                    source,
                });
            }
        }
    }

    Ok(())
}
