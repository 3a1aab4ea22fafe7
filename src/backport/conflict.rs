//! Deterministic conflict resolution
//!
//! A cherry-pick paused on conflict can sometimes be settled mechanically: when
//! the only conflicting file is a generated artifact, regenerating it on top of
//! the target branch yields the correct content. Each [`ConflictResolver`]
//! knows one such conflict shape; the cherry-pick engine tries them in order.

use crate::config::ArtifactResolverConfig;
use crate::error::{Error, Result};
use crate::runner::CommandRunner;
use async_trait::async_trait;
use tracing::debug;

/// Baseline file regenerated by default
pub const BETTERER_RESULTS: &str = ".betterer.results";

/// Strategy for settling one known conflict shape
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    /// Human-readable description of the conflict shape this resolver handles
    fn signature(&self) -> String;

    /// Try to settle the paused cherry-pick and complete it
    ///
    /// Only called while a cherry-pick is stopped on a conflict. On success
    /// the cherry-pick has been continued and committed.
    async fn try_resolve(&self, runner: &dyn CommandRunner) -> Result<()>;
}

/// A generated file that can be rebuilt with a deterministic command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerableArtifact {
    path: String,
    program: String,
    args: Vec<String>,
}

impl RegenerableArtifact {
    /// Artifact at `path` rebuilt by running `program args...`
    pub fn new(path: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            path: path.into(),
            program: program.into(),
            args,
        }
    }

    /// The betterer regression baseline, regenerated with `yarn run betterer`
    pub fn betterer() -> Self {
        Self::new(
            BETTERER_RESULTS,
            "yarn",
            vec!["run".to_string(), "betterer".to_string()],
        )
    }

    /// Path of the artifact
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl TryFrom<&ArtifactResolverConfig> for RegenerableArtifact {
    type Error = Error;

    fn try_from(config: &ArtifactResolverConfig) -> Result<Self> {
        let (program, args) = config.command.split_first().ok_or_else(|| {
            Error::Config(format!(
                "conflict resolver for '{}' has an empty command",
                config.path
            ))
        })?;
        Ok(Self::new(config.path.clone(), program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl ConflictResolver for RegenerableArtifact {
    fn signature(&self) -> String {
        format!(
            "{} regenerated by `{} {}`",
            self.path,
            self.program,
            self.args.join(" ")
        )
    }

    async fn try_resolve(&self, runner: &dyn CommandRunner) -> Result<()> {
        // `git diff --exit-code` exits 1 when the file has changed
        match runner
            .run("git", &["diff", "-s", "--exit-code", "--", &self.path])
            .await
        {
            Ok(_) => {
                return Err(Error::Unresolved(format!("{} has not changed", self.path)));
            }
            Err(e) if e.status() == Some(1) => {}
            Err(e) => {
                return Err(Error::Unresolved(format!("cannot diff {}: {e}", self.path)));
            }
        }

        debug!(path = %self.path, program = %self.program, "regenerating artifact");
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        runner.run(&self.program, &args).await?;

        runner.run("git", &["add", &self.path]).await?;

        runner
            .run("git", &["-c", "core.editor=true", "cherry-pick", "--continue"])
            .await?;

        Ok(())
    }
}

/// Resolvers built from configuration, or the betterer default when none are configured
pub fn resolvers_from_config(
    configs: &[ArtifactResolverConfig],
) -> Result<Vec<Box<dyn ConflictResolver>>> {
    if configs.is_empty() {
        return Ok(default_resolvers());
    }

    configs
        .iter()
        .map(|c| {
            RegenerableArtifact::try_from(c).map(|r| Box::new(r) as Box<dyn ConflictResolver>)
        })
        .collect()
}

/// The built-in resolver set
pub fn default_resolvers() -> Vec<Box<dyn ConflictResolver>> {
    vec![Box::new(RegenerableArtifact::betterer())]
}

/// Try each resolver in order until one settles the conflict
///
/// Returns the signature of the resolver that succeeded.
pub async fn resolve_conflict(
    resolvers: &[Box<dyn ConflictResolver>],
    runner: &dyn CommandRunner,
) -> Result<String> {
    let mut reasons = Vec::new();

    for resolver in resolvers {
        let signature = resolver.signature();
        match resolver.try_resolve(runner).await {
            Ok(()) => {
                debug!(resolver = %signature, "conflict resolved");
                return Ok(signature);
            }
            Err(e) => {
                debug!(resolver = %signature, error = %e, "resolver did not apply");
                reasons.push(format!("{signature}: {e}"));
            }
        }
    }

    if reasons.is_empty() {
        return Err(Error::Unresolved("no conflict resolvers configured".to_string()));
    }
    Err(Error::Unresolved(reasons.join("; ")))
}
