//! Startup configuration
//!
//! Configuration is assembled once, before any backport work starts, from (lowest
//! to highest precedence): built-in defaults, an optional TOML file, the GitHub
//! Actions environment and event payload, explicit environment overrides, and
//! command-line flags. The result is never mutated afterwards.

use crate::error::{Error, Result};
use crate::platform::DEFAULT_API_BASE;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = ".github/backport.toml";

/// Git remote used when none is configured
pub const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_BRANCH_PAGE_SIZE: u32 = 50;
const DEFAULT_COMMIT_PAGE_SIZE: u32 = 100;
/// History depth fetched when no merge base is known
pub const DEFAULT_FALLBACK_FETCH_DEPTH: u32 = 200;

/// A generated file that can be rebuilt to settle a cherry-pick conflict
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ArtifactResolverConfig {
    /// Path of the generated file, relative to the repository root
    pub path: String,
    /// Generator command (program followed by its arguments)
    pub command: Vec<String>,
}

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Git remote to fetch from and push to
    pub remote: Option<String>,
    /// Page size for branch listing
    pub branch_page_size: Option<u32>,
    /// Maximum number of PR commits to replay
    pub commit_page_size: Option<u32>,
    /// History depth fetched when no merge base is known
    pub fallback_fetch_depth: Option<u32>,
    /// Labels added to every backport PR
    pub labels_to_add: Vec<String>,
    /// Conflict resolvers for generated artifacts
    pub conflict_resolvers: Vec<ArtifactResolverConfig>,
}

impl FileConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Repository owner
    pub owner: Option<String>,
    /// Repository name
    pub repo: Option<String>,
    /// Source pull request number
    pub pr_number: Option<u64>,
    /// Single label to resolve targets from
    pub label: Option<String>,
    /// Path to the TOML config file
    pub config_path: Option<PathBuf>,
    /// Git remote name
    pub remote: Option<String>,
}

#[derive(Deserialize)]
struct EventPayload {
    number: Option<u64>,
    pull_request: Option<EventPullRequest>,
    label: Option<EventLabel>,
}

#[derive(Deserialize)]
struct EventPullRequest {
    number: u64,
}

#[derive(Deserialize)]
struct EventLabel {
    name: String,
}

/// Fully resolved configuration for one backport run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Source pull request number
    pub pr_number: u64,
    /// When set, targets are resolved from this label only
    pub label: Option<String>,
    /// Labels added to every backport PR
    pub labels_to_add: Vec<String>,
    /// Git remote to fetch from and push to
    pub remote: String,
    /// Page size for branch listing
    pub branch_page_size: u32,
    /// Maximum number of PR commits to replay
    pub commit_page_size: u32,
    /// History depth fetched when no merge base is known
    pub fallback_fetch_depth: u32,
    /// GitHub REST base URL
    pub api_base: String,
    /// Conflict resolvers for generated artifacts (empty means built-in default)
    pub conflict_resolvers: Vec<ArtifactResolverConfig>,
}

impl BackportConfig {
    /// Load configuration from the process environment
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve configuration using `lookup` for environment variables
    pub fn resolve<F>(lookup: F, overrides: &CliOverrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = match &overrides.config_path {
            Some(path) => FileConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                FileConfig::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => FileConfig::default(),
        };

        let event = match env("GITHUB_EVENT_PATH") {
            Some(path) => Some(load_event(Path::new(&path))?),
            None => None,
        };

        let (mut owner, mut repo) = match env("GITHUB_REPOSITORY") {
            Some(full) => {
                let (o, r) = split_repository(&full)?;
                (Some(o), Some(r))
            }
            None => (None, None),
        };
        if let Some(o) = env("REPO_OWNER") {
            owner = Some(o);
        }
        if let Some(r) = env("REPO_NAME") {
            repo = Some(r);
        }
        let owner = overrides.owner.clone().or(owner).ok_or_else(|| {
            Error::Config("repository owner not set (REPO_OWNER or GITHUB_REPOSITORY)".to_string())
        })?;
        let repo = overrides.repo.clone().or(repo).ok_or_else(|| {
            Error::Config("repository name not set (REPO_NAME or GITHUB_REPOSITORY)".to_string())
        })?;

        let env_pr_number = env("PR_NUMBER")
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| Error::Config(format!("invalid PR_NUMBER '{v}': {e}")))
            })
            .transpose()?;
        let event_pr_number = event
            .as_ref()
            .and_then(|e| e.pull_request.as_ref().map(|pr| pr.number).or(e.number));
        let pr_number = overrides
            .pr_number
            .or(env_pr_number)
            .or(event_pr_number)
            .ok_or_else(|| {
                Error::Config("pull request number not set (PR_NUMBER or event payload)".to_string())
            })?;

        let label = overrides
            .label
            .clone()
            .or_else(|| env("PR_LABEL"))
            .or_else(|| event.and_then(|e| e.label.map(|l| l.name)));

        let labels_to_add = env("INPUT_LABELS_TO_ADD")
            .map(|v| split_labels(&v))
            .unwrap_or(file.labels_to_add);

        let config = Self {
            owner,
            repo,
            pr_number,
            label,
            labels_to_add,
            remote: overrides
                .remote
                .clone()
                .or(file.remote)
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            branch_page_size: file.branch_page_size.unwrap_or(DEFAULT_BRANCH_PAGE_SIZE),
            commit_page_size: file.commit_page_size.unwrap_or(DEFAULT_COMMIT_PAGE_SIZE),
            fallback_fetch_depth: file
                .fallback_fetch_depth
                .unwrap_or(DEFAULT_FALLBACK_FETCH_DEPTH),
            api_base: env("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            conflict_resolvers: file.conflict_resolvers,
        };
        config.validate()?;

        debug!(?config, "resolved configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.branch_page_size == 0 || self.commit_page_size == 0 {
            return Err(Error::Config("page sizes must be greater than zero".to_string()));
        }
        if let Some(resolver) = self.conflict_resolvers.iter().find(|r| r.command.is_empty()) {
            return Err(Error::Config(format!(
                "conflict resolver for '{}' has an empty command",
                resolver.path
            )));
        }
        Ok(())
    }
}

fn load_event(path: &Path) -> Result<EventPayload> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read event payload {}: {e}",
            path.display()
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "failed to parse event payload {}: {e}",
            path.display()
        ))
    })
}

fn split_repository(full: &str) -> Result<(String, String)> {
    match full.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::Config(format!(
            "GITHUB_REPOSITORY must look like owner/repo, got '{full}'"
        ))),
    }
}

/// Split a comma-separated label list, dropping blank entries
pub fn split_labels(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}
