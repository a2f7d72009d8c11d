use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to read event file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse event file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Event payload has no pull_request; was this run triggered by a pull request event?")]
    MissingPullRequest,
}

/// The slice of a GitHub webhook payload the reviewer cares about.
/// Other keys are ignored.
#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: u64,
}

/// Read the event file at `path` and return `pull_request.number`.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_pr_number(path: &Path) -> Result<u64, EventError> {
    let contents = fs::read_to_string(path).map_err(|source| EventError::Read {
        path: path.display().to_string(),
        source,
    })?;
    debug!(bytes = contents.len(), "read event payload");
    parse_pr_number(&contents)
}

pub fn parse_pr_number(contents: &str) -> Result<u64, EventError> {
    let payload: EventPayload = serde_json::from_str(contents)?;
    payload
        .pull_request
        .map(|pr| pr.number)
        .ok_or(EventError::MissingPullRequest)
}
