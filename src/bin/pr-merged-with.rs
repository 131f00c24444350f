//! pr-merged-with - print how a pull request was merged (`rebase` or `squash`)

use anyhow::Context;
use clap::Parser;
use gh_cherry_pick::cherry_pick::run_until_cancelled;
use gh_cherry_pick::config::load_config;
use gh_cherry_pick::platform::{Backend, create_platform_service};
use gh_cherry_pick::strategy::infer_merge_strategy;
use gh_cherry_pick::vcs::GitRepo;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pr-merged-with")]
#[command(version)]
#[command(about = "Print whether a merged pull request was rebase- or squash-merged", long_about = None)]
struct Cli {
    /// Number of the merged pull request
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pr: u64,

    /// Remote used to locate the repository (api backend)
    #[arg(long)]
    remote: Option<String>,

    /// Code-host backend: gh (CLI) or api (REST)
    #[arg(long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Repository directory
    #[arg(short = 'C', long)]
    path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
        .map_err(|e: gh_cherry_pick::error::Error| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gh_cherry_pick=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config()?.with_env(|key| std::env::var(key).ok());
    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let repo = GitRepo::open(&path, config.executor()).await?;

    let remote = cli.remote.unwrap_or_else(|| config.remote.clone());
    let backend = cli.backend.unwrap_or(config.backend);
    let platform = create_platform_service(
        backend,
        repo.executor(),
        &repo,
        &remote,
        config.host.as_deref(),
    )
    .await?;

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let strategy = run_until_cancelled(infer_merge_strategy(platform.as_ref(), cli.pr), cancel)
        .await
        .with_context(|| format!("failed to determine how PR #{} was merged", cli.pr))?;

    println!("{strategy}");
    Ok(())
}
