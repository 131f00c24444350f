//! Cherry-pick command - replay a merged PR onto another branch

use crate::cli::{CliProgress, interrupted};
use crate::cli::context::{CommandContext, ContextOverrides};
use crate::cli::style::{CHECK, Stylize, arrow, pr_link};
use anstream::println;
use dialoguer::Confirm;
use gh_cherry_pick::cherry_pick::{
    CherryPick, CherryPickOutcome, CherryPickPlan, run_until_cancelled,
};
use gh_cherry_pick::config::Config;
use gh_cherry_pick::error::{Error, Result};
use gh_cherry_pick::platform::Backend;
use gh_cherry_pick::types::{CherryPickRequest, MergeStrategy};
use std::path::Path;

/// Options for the cherry-pick command
#[derive(Debug, Clone, Default)]
pub struct CherryPickOptions {
    /// PR to cherry-pick
    pub pr: u64,
    /// Target branch
    pub onto: String,
    /// `--merge`, falling back to the config
    pub merge: Option<MergeStrategy>,
    /// `--push` / `--no-push`, falling back to the config
    pub push: Option<bool>,
    /// `--remote`, falling back to the config
    pub remote: Option<String>,
    /// `--backend`, falling back to the config
    pub backend: Option<Backend>,
    /// Show the plan without touching the repository
    pub dry_run: bool,
    /// Preview the plan and prompt before touching the repository
    pub confirm: bool,
    /// Print every step detail
    pub verbose: bool,
}

/// Build the request from flags and config (CLI > config > default)
pub fn build_request(options: &CherryPickOptions, config: &Config) -> Result<CherryPickRequest> {
    let remote = options
        .remote
        .clone()
        .unwrap_or_else(|| config.remote.clone());

    CherryPickRequest::new(options.pr, options.onto.as_str())?
        .with_strategy(options.merge.unwrap_or(config.merge))
        .with_push(options.push.unwrap_or(config.push))
        .with_remote(remote)
}

/// Run the cherry-pick command
pub async fn run_cherry_pick(path: &Path, config: Config, options: CherryPickOptions) -> Result<()> {
    // Reject a malformed request before any external call
    let request = build_request(&options, &config)?;

    let ctx = run_until_cancelled(
        CommandContext::new(
            path,
            &config,
            ContextOverrides {
                remote: Some(request.remote().to_string()),
                backend: options.backend,
            },
        ),
        interrupted(),
    )
    .await?;

    let progress = if options.verbose {
        CliProgress::detailed()
    } else {
        CliProgress::compact()
    };
    let mut cherry_pick =
        CherryPick::new(&ctx.repo, ctx.platform.as_ref(), &progress).with_cancel(interrupted());

    let plan = cherry_pick.prepare(&request).await?;

    if options.dry_run {
        print_plan_preview(&plan);
        println!("{}", "Dry run complete".muted());
        return Ok(());
    }

    if options.confirm {
        print_plan_preview(&plan);
        if !run_until_cancelled(confirm("Proceed with cherry-pick?"), interrupted()).await? {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    let outcome = cherry_pick.apply(&plan).await?;
    print_summary(&plan, &outcome, &ctx.remote);
    Ok(())
}

/// Ask a yes/no question on the terminal
///
/// The prompt blocks, so it runs off the async workers.
async fn confirm(prompt: &'static str) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
    })
    .await
    .map_err(|e| Error::Internal(format!("confirmation prompt failed: {e}")))?
    .map_err(confirmation_error)
}

/// Ctrl-C at the prompt is a cancellation, not a failure
fn confirmation_error(err: dialoguer::Error) -> Error {
    match err {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            Error::Cancelled
        }
        dialoguer::Error::IO(e) => {
            Error::Internal(format!("Failed to read confirmation: {e}"))
        }
    }
}

/// Print the plan for --dry-run and --confirm
fn print_plan_preview(plan: &CherryPickPlan) {
    println!();
    println!(
        "{} {} {}",
        "Cherry-pick plan for".emphasis(),
        pr_link(plan.pr.number, &plan.pr.html_url),
        plan.pr.title
    );
    let source = if plan.strategy_inferred {
        "inferred"
    } else {
        "requested"
    };
    println!(
        "  merged with {} ({})",
        plan.strategy.accent(),
        source.muted()
    );
    println!();

    println!("  {}:", "Steps".emphasis());
    for action in plan.actions() {
        println!("    {} {}", arrow(), action);
    }
    println!();
}

fn print_summary(plan: &CherryPickPlan, outcome: &CherryPickOutcome, remote: &str) {
    println!();
    println!(
        "{} PR {} onto {}",
        format!("{CHECK} Cherry-picked").success(),
        pr_link(outcome.pr_number, &plan.pr.html_url),
        outcome.branch.onto.accent()
    );
    println!("   Branch: {}", outcome.branch.name.accent());
    println!("   Strategy: {}", outcome.strategy.accent());

    if outcome.pushed {
        println!("   Pushed to {}", remote.accent());
    } else {
        println!(
            "   {}",
            format!(
                "Push with: git push --set-upstream {remote} {}",
                outcome.branch.name
            )
            .muted()
        );
    }
}
