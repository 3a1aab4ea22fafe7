//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by the run and targets commands.

use backport::auth::get_github_auth;
use backport::backport::{BackportOptions, ConflictResolver, resolvers_from_config};
use backport::config::{BackportConfig, CliOverrides};
use backport::error::Result;
use backport::platform::{GitHubService, PlatformService};
use backport::runner::ShellCommandRunner;
use tracing::debug;

/// Shared context for CLI commands that interact with GitHub
///
/// This struct encapsulates the common setup needed by run and targets:
/// - Loading configuration
/// - Finding a token
/// - Creating the platform service
/// - Building the conflict resolvers
pub struct CommandContext {
    /// Resolved configuration
    pub config: BackportConfig,
    /// Platform service (GitHub)
    pub platform: Box<dyn PlatformService>,
    /// Runs git and generator commands in the current directory
    pub runner: ShellCommandRunner,
    /// Conflict resolvers, in the order they are tried
    pub resolvers: Vec<Box<dyn ConflictResolver>>,
}

impl CommandContext {
    /// Create a new command context
    pub async fn new(overrides: &CliOverrides) -> Result<Self> {
        let config = BackportConfig::load(overrides)?;
        let runner = ShellCommandRunner::new();

        let auth = get_github_auth(|key| std::env::var(key).ok(), &runner).await?;
        debug!(source = ?auth.source, "authenticated");

        let platform = GitHubService::with_api_base(
            &auth.token,
            config.owner.clone(),
            config.repo.clone(),
            &config.api_base,
        )?;

        let resolvers = resolvers_from_config(&config.conflict_resolvers)?;

        Ok(Self {
            config,
            platform: Box::new(platform),
            runner,
            resolvers,
        })
    }

    /// Backport options derived from the configuration
    pub fn options(&self) -> BackportOptions {
        BackportOptions::from(&self.config)
    }
}
