mod comment;
mod config;
mod event;
mod github;
mod pipeline;
mod prompt;
mod review;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// PR Reviewer — reviews the pull request named by a GitHub Actions event
/// with Claude and posts the review as a PR comment.
///
/// Reads GITHUB_TOKEN, ANTHROPIC_API_KEY, GITHUB_REPOSITORY and
/// GITHUB_EVENT_PATH from the environment.
#[derive(Parser, Debug)]
#[command(name = "pr-reviewer", version, about)]
struct Cli {
    /// Optional TOML settings file (defaults to .pr-reviewer.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the review comment instead of posting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(repo = %config.repository, api = %config.github_api_url, model = %config.settings.model.name, "configuration loaded");

    let host = github::GitHubClient::from_config(&config);
    let model = review::AnthropicClient::from_config(&config);

    let outcome = pipeline::run(&config, &host, &model, cli.dry_run).await?;
    info!(pr = outcome.pr_number, posted = outcome.posted, comment_bytes = outcome.comment.len(), "done");

    Ok(())
}
