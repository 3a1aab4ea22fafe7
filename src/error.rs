//! Error types for backport

use crate::runner::CommandError;
use thiserror::Error;

/// Errors that can occur while resolving or running a backport
#[derive(Debug, Error)]
pub enum Error {
    /// The source pull request has not been merged
    #[error("pull request is not merged; nothing to do")]
    NotMerged,

    /// The source pull request carries no labels at all
    #[error("no labels found")]
    NoLabels,

    /// No `backport <branch>` label matched a known branch
    #[error("no release branch found for labels {0:?}")]
    NoBranchFound(Vec<String>),

    /// Neither an ordered commit list nor a fallback SHA was provided
    #[error("no source commits provided for cherry-pick")]
    NoSourceCommits,

    /// Fetching one of the source commits failed
    #[error("error fetching source commit {sha}: {source}")]
    FetchSource {
        /// Commit that could not be fetched
        sha: String,
        /// Underlying command failure
        source: CommandError,
    },

    /// Fetching the target branch failed
    #[error("error fetching target branch {branch}: {source}")]
    FetchTarget {
        /// Target branch name
        branch: String,
        /// Underlying command failure
        source: CommandError,
    },

    /// Fetching the shallow history context failed
    #[error("error fetching history context: {source}")]
    FetchHistory {
        /// Underlying command failure
        source: CommandError,
    },

    /// Creating the local backport branch failed
    #[error("error creating branch {branch}: {source}")]
    CreateBranch {
        /// Branch that could not be created
        branch: String,
        /// Underlying command failure
        source: CommandError,
    },

    /// A cherry-pick failed and no conflict resolver could repair it
    #[error("error running git cherry-pick for {sha}: {source}")]
    CherryPick {
        /// Commit being replayed when the failure happened
        sha: String,
        /// Underlying command failure
        source: CommandError,
    },

    /// Pushing the backport branch failed
    #[error("error pushing branch {branch}: {source}")]
    Push {
        /// Branch that could not be pushed
        branch: String,
        /// Underlying command failure
        source: CommandError,
    },

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Conflict resolution could not repair the paused cherry-pick
    #[error("conflict not resolved: {0}")]
    Unresolved(String),

    /// Command execution error outside of a specific backport step
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Result type alias for backport operations
pub type Result<T> = std::result::Result<T, Error>;
