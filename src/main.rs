//! gh-cherry-pick - cherry-pick a merged PR onto another branch

mod cli;

use clap::Parser;
use cli::cherry_pick::{CherryPickOptions, run_cherry_pick};
use cli::context::resolve_config;
use cli::style::{Stylize, cross};
use gh_cherry_pick::error::{Error, Result};
use gh_cherry_pick::platform::Backend;
use gh_cherry_pick::types::MergeStrategy;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gh-cherry-pick")]
#[command(version)]
#[command(about = "Cherry-pick a merged pull request onto another branch", long_about = None)]
struct Cli {
    /// Number of the merged pull request
    #[arg(long)]
    pr: u64,

    /// Branch to cherry-pick onto
    #[arg(long)]
    onto: String,

    /// How the PR was merged: rebase, squash or auto (infer)
    #[arg(long, value_parser = parse_merge_strategy)]
    merge: Option<MergeStrategy>,

    /// Push the new branch to the remote
    #[arg(long, overrides_with = "no_push")]
    push: bool,

    /// Do not push, even if the config says to
    #[arg(long, overrides_with = "push")]
    no_push: bool,

    /// Remote to fetch from and push to [default: origin]
    #[arg(long)]
    remote: Option<String>,

    /// Code-host backend: gh (CLI) or api (REST) [default: gh]
    #[arg(long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Show what would be done without touching the repository
    #[arg(long)]
    dry_run: bool,

    /// Preview the plan and prompt for confirmation
    #[arg(long, conflicts_with = "dry_run")]
    confirm: bool,

    /// Repository directory
    #[arg(short = 'C', long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_merge_strategy(s: &str) -> std::result::Result<MergeStrategy, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

fn parse_backend(s: &str) -> std::result::Result<Backend, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

/// `--push` / `--no-push`; `None` leaves it to the config
const fn push_flag(push: bool, no_push: bool) -> Option<bool> {
    if push {
        Some(true)
    } else if no_push {
        Some(false)
    } else {
        None
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gh_cherry_pick=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let config = resolve_config()?;

    let options = CherryPickOptions {
        pr: cli.pr,
        onto: cli.onto,
        merge: cli.merge,
        push: push_flag(cli.push, cli.no_push),
        remote: cli.remote,
        backend: cli.backend,
        dry_run: cli.dry_run,
        confirm: cli.confirm,
        verbose: cli.verbose,
    };

    run_cherry_pick(&path, config, options).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::eprintln!("{} {e}", cross());
            if e.is_recoverable() {
                anstream::eprintln!(
                    "{}",
                    "the branch was left as is so the operation can be finished by hand".muted()
                );
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
