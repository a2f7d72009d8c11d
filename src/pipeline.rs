use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};

use crate::comment;
use crate::config::Config;
use crate::event::{self, EventError};
use crate::github::{DiffStats, GitHubError, PullRequestHost};
use crate::prompt;
use crate::review::{ReviewError, ReviewModel};

/// A failed run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Loading event failed: {0}")]
    Event(#[from] EventError),

    #[error("Fetching pull request #{number} failed: {source}")]
    FetchPullRequest {
        number: u64,
        #[source]
        source: GitHubError,
    },

    #[error("Fetching diff failed: {0}")]
    FetchDiff(#[source] GitHubError),

    #[error("Requesting review failed: {0}")]
    Review(#[from] ReviewError),

    #[error("Posting comment to pull request #{number} failed: {source}")]
    PostComment {
        number: u64,
        #[source]
        source: GitHubError,
    },
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub pr_number: u64,
    pub comment: String,
    pub posted: bool,
}

/// Review one pull request end to end.
///
/// Steps run strictly in order and the first failure ends the run, so a
/// failed fetch never reaches the model and a failed review never posts.
/// With `dry_run` the comment body goes to stdout instead of GitHub.
pub async fn run(
    config: &Config,
    host: &dyn PullRequestHost,
    model: &dyn ReviewModel,
    dry_run: bool,
) -> Result<Outcome, PipelineError> {
    let pr_number = event::load_pr_number(&config.event_path)?;
    println!("{}", comment::reviewing_line(pr_number));

    let span = info_span!("review_pr", repo = %config.repository, pr = pr_number);
    async move {
        let repo = &config.repository;

        info!("fetching pull request");
        let pull_request = host
            .get_pull_request(repo, pr_number)
            .await
            .map_err(|source| PipelineError::FetchPullRequest {
                number: pr_number,
                source,
            })?;

        info!("fetching diff");
        let diff_text = host
            .get_diff(&pull_request.diff_url)
            .await
            .map_err(PipelineError::FetchDiff)?;
        let stats = DiffStats::from_unified(&diff_text);
        debug!(files = stats.files, additions = stats.additions, deletions = stats.deletions, "diff stats");

        let diff_for_prompt = prompt::limit_diff(&diff_text, config.settings.diff.max_bytes);
        if diff_for_prompt.len() != diff_text.len() {
            info!(original = diff_text.len(), kept = diff_for_prompt.len(), "diff truncated");
        }
        let review_prompt = prompt::build_prompt(
            &repo.to_string(),
            &pull_request.title,
            &pull_request.body,
            &diff_for_prompt,
        );

        info!(model = model.name(), "requesting review");
        let review_text = model.complete(&review_prompt).await?;
        let body = comment::render(&review_text);

        if dry_run {
            info!("dry run, not posting");
            println!("{body}");
            return Ok(Outcome {
                pr_number,
                comment: body,
                posted: false,
            });
        }

        info!("posting comment");
        host.post_comment(repo, pr_number, &body)
            .await
            .map_err(|source| PipelineError::PostComment {
                number: pr_number,
                source,
            })?;
        println!("{}", comment::posted_line());

        Ok(Outcome {
            pr_number,
            comment: body,
            posted: true,
        })
    }
    .instrument(span)
    .await
}
