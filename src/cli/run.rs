//! Run command - backport a merged PR onto its labeled release branches

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize, arrow, check, cross, spinner_style};
use anstream::println;
use backport::backport::{BackportExecutionResult, BackportPlan, execute_backport, plan_backport};
use backport::config::CliOverrides;
use backport::error::{Error, Result};
use dialoguer::Confirm;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::warn;

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Resolve and print the plan without changing anything
    pub dry_run: bool,
    /// Preview plan and prompt for confirmation before executing
    pub confirm: bool,
}

/// Run the backport command
///
/// Returns `Ok(true)` when every target was backported (or there was nothing
/// to do) and `Ok(false)` when at least one target failed.
pub async fn run_backport(overrides: &CliOverrides, options: RunOptions) -> Result<bool> {
    let ctx = CommandContext::new(overrides).await?;
    let backport_options = ctx.options();

    // =========================================================================
    // Phase 1: PLAN - gather PR data and resolve targets
    // =========================================================================

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Resolving targets for {}#{}...",
        ctx.platform.config(),
        ctx.config.pr_number
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let plan = match plan_backport(ctx.platform.as_ref(), &backport_options).await {
        Ok(plan) => plan,
        Err(Error::NotMerged) => {
            spinner.finish_and_clear();
            warn!(pr_number = ctx.config.pr_number, "pull request is not merged; nothing to do");
            println!("{}", "Pull request is not merged; nothing to do".muted());
            return Ok(true);
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    spinner.finish_with_message(format!(
        "{} Resolved {} target(s)",
        check(),
        plan.targets.len().accent()
    ));

    if options.dry_run {
        print_plan(&plan);
        println!("{}", "Dry run complete".muted());
        return Ok(true);
    }

    if options.confirm {
        print_plan(&plan);
        if !Confirm::new()
            .with_prompt("Proceed with backport?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(true);
        }
        println!();
    }

    // =========================================================================
    // Phase 2: EXECUTE - one target at a time
    // =========================================================================

    println!(
        "{} {}",
        "Backporting".emphasis(),
        format!("#{}: {}", plan.details.number, plan.details.title).accent()
    );

    let progress = CliProgress::compact();
    let result = execute_backport(
        &plan,
        ctx.platform.as_ref(),
        &ctx.runner,
        &ctx.resolvers,
        &progress,
        &backport_options,
    )
    .await;

    print_summary(&result);
    Ok(result.is_success())
}

/// Print the resolved plan
fn print_plan(plan: &BackportPlan) {
    println!("{}:", "Backport plan".emphasis());
    println!();
    for target in &plan.targets {
        println!("  {} {}", arrow(), target.name.accent());
    }
    println!();
}

/// Print created PRs and failed targets
fn print_summary(result: &BackportExecutionResult) {
    println!();
    for (target, pr) in &result.created_prs {
        println!("{} {} {}", check(), target.accent(), pr.html_url.muted());
    }
    for failure in &result.failures {
        println!("{} {} {}", cross(), failure.target.accent(), failure.error.error());
    }

    if result.is_success() {
        println!(
            "{} {} PR(s) opened",
            format!("{CHECK} Backport complete:").success(),
            result.created_prs.len().accent()
        );
    } else {
        println!(
            "{} {} opened, {} failed",
            "Backport incomplete:".error(),
            result.created_prs.len().accent(),
            result.failures.len().accent()
        );
    }
}
