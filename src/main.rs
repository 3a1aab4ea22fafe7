//! backport CLI entry point

mod cli;

use anyhow::{Context, Result};
use backport::config::CliOverrides;
use clap::{Args, Parser, Subcommand};
use cli::RunOptions;
use cli::style::Stylize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Backport merged pull requests onto release branches
#[derive(Parser)]
#[command(
    name = "backport",
    version,
    about = "Backport merged pull requests onto release branches"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    source: SourceArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the source PR lives; each flag overrides the environment
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Repository owner (defaults to REPO_OWNER or GITHUB_REPOSITORY)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Repository name (defaults to REPO_NAME or GITHUB_REPOSITORY)
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Source pull request number (defaults to PR_NUMBER or the event payload)
    #[arg(long = "pr", global = true)]
    pr_number: Option<u64>,

    /// Resolve targets from this label only (defaults to PR_LABEL)
    #[arg(long, global = true)]
    label: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Git remote to fetch from and push to
    #[arg(long, global = true)]
    remote: Option<String>,
}

impl From<SourceArgs> for CliOverrides {
    fn from(args: SourceArgs) -> Self {
        Self {
            owner: args.owner,
            repo: args.repo,
            pr_number: args.pr_number,
            label: args.label,
            config_path: args.config,
            remote: args.remote,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Cherry-pick the PR onto each labeled branch and open backport PRs (default)
    Run {
        /// Show the plan without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Preview the plan and ask before executing
        #[arg(long)]
        confirm: bool,
    },
    /// List the branches the PR would be backported to
    Targets,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "backport=debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<bool> {
    let overrides = CliOverrides::from(cli.source);

    match cli.command.unwrap_or(Commands::Run {
        dry_run: false,
        confirm: false,
    }) {
        Commands::Run { dry_run, confirm } => {
            cli::run_backport(&overrides, RunOptions { dry_run, confirm })
                .await
                .context("backport failed")
        }
        Commands::Targets => {
            cli::run_targets(&overrides)
                .await
                .context("failed to resolve backport targets")?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            anstream::eprintln!("{} {e:#}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
