//! Authentication for GitHub
//!
//! Supports environment variables and the `gh` CLI.

use crate::error::{Error, Result};
use crate::runner::CommandRunner;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// Resolved GitHub credentials
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Find a GitHub token
///
/// Checks `GITHUB_TOKEN` and `GH_TOKEN` through `lookup`, then falls back to
/// `gh auth token`.
pub async fn get_github_auth<F>(lookup: F, runner: &dyn CommandRunner) -> Result<GitHubAuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    for var in TOKEN_VARS {
        if let Some(token) = lookup(var).filter(|t| !t.trim().is_empty()) {
            debug!(var, "using token from environment");
            return Ok(GitHubAuthConfig {
                token: token.trim().to_string(),
                source: AuthSource::EnvVar,
            });
        }
    }

    let output = runner.run("gh", &["auth", "token"]).await.map_err(|e| {
        Error::Auth(format!(
            "no GITHUB_TOKEN or GH_TOKEN set and `gh auth token` failed: {e}"
        ))
    })?;

    let token = output.output.trim();
    if token.is_empty() {
        return Err(Error::Auth("`gh auth token` returned an empty token".to_string()));
    }

    debug!("using token from gh CLI");
    Ok(GitHubAuthConfig {
        token: token.to_string(),
        source: AuthSource::Cli,
    })
}
