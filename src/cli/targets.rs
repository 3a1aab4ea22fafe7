//! Targets command - show where a PR would be backported

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow};
use anstream::println;
use backport::backport::plan_backport;
use backport::config::CliOverrides;
use backport::error::Result;

/// Run the targets command
///
/// Resolves targets without touching the working tree.
pub async fn run_targets(overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::new(overrides).await?;
    let plan = plan_backport(ctx.platform.as_ref(), &ctx.options()).await?;

    println!(
        "{} {}",
        format!("PR #{}", plan.details.number).emphasis(),
        plan.details.title
    );
    println!();
    println!("  {}:", "Targets".emphasis());
    for target in &plan.targets {
        println!("    {} {}", arrow(), target.name.accent());
    }
    println!();
    println!(
        "  {}: {}",
        "Commits".emphasis(),
        if plan.commits.is_empty() {
            plan.details
                .merge_commit_sha
                .clone()
                .unwrap_or_else(|| "(none)".to_string())
        } else {
            plan.commits.join(", ")
        }
        .muted()
    );
    if plan.commits_truncated {
        println!(
            "  {}",
            "Commit list hit the page size, later commits are not included".warn()
        );
    }

    Ok(())
}
