use serde::{Deserialize, Deserializer, Serialize};

/// Pull request metadata returned by `GET /repos/{repo}/pulls/{number}`.
/// Only the fields the review needs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    /// PR title
    pub title: String,
    /// PR description. GitHub sends `null` for an empty description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Link to the unified diff (e.g. https://github.com/org/repo/pull/42.diff)
    pub diff_url: String,
}

/// Request body for `POST /repos/{repo}/issues/{number}/comments`.
#[derive(Debug, Serialize)]
pub struct NewComment<'a> {
    pub body: &'a str,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
