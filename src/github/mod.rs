pub mod diff;
pub mod types;

pub use diff::DiffStats;
pub use types::PullRequest;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{Config, Repository};
use types::NewComment;

const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const CLIENT_NAME: &str = "pr-reviewer";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// The three calls a review run makes against the code host.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    async fn get_pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<PullRequest, GitHubError>;

    async fn get_diff(&self, diff_url: &str) -> Result<String, GitHubError>;

    async fn post_comment(
        &self,
        repo: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError>;
}

/// GitHub REST client authenticated with a bearer token.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.github_api_url.clone(), config.github_token.clone())
    }

    fn get(&self, url: &str, accept: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(USER_AGENT, CLIENT_NAME)
            .header(ACCEPT, accept)
            .bearer_auth(&self.token)
    }
}

/// Fail on any non-2xx status, keeping the response body for diagnostics.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GitHubError::Status { status, body })
}

#[async_trait]
impl PullRequestHost for GitHubClient {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn get_pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<PullRequest, GitHubError> {
        let url = format!("{}/repos/{}/pulls/{}", self.api_url, repo, number);
        debug!("fetching PR metadata from GitHub API");
        let response = self.get(&url, JSON_MEDIA_TYPE).send().await?;
        let pull_request = check_status(response).await?.json::<PullRequest>().await?;
        debug!(title = %pull_request.title, body_bytes = pull_request.body.len(), "received PR metadata");
        Ok(pull_request)
    }

    #[instrument(skip(self))]
    async fn get_diff(&self, diff_url: &str) -> Result<String, GitHubError> {
        debug!("fetching PR diff");
        let response = self.get(diff_url, DIFF_MEDIA_TYPE).send().await?;
        let diff_text = check_status(response).await?.text().await?;
        debug!(diff_bytes = diff_text.len(), "received PR diff");
        Ok(diff_text)
    }

    #[instrument(skip(self, repo, body), fields(repo = %repo, body_bytes = body.len()))]
    async fn post_comment(
        &self,
        repo: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        let url = format!("{}/repos/{}/issues/{}/comments", self.api_url, repo, number);
        debug!("posting review comment");
        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, CLIENT_NAME)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .bearer_auth(&self.token)
            .json(&NewComment { body })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> Repository {
        Repository::parse("octo/widgets").unwrap()
    }

    #[tokio::test]
    async fn test_get_pull_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls/42"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(header("accept", JSON_MEDIA_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 42,
                "title": "Fix bug",
                "body": null,
                "diff_url": format!("{}/octo/widgets/pull/42.diff", server.uri()),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), "ghp_test");
        let pr = client.get_pull_request(&repo(), 42).await.unwrap();
        assert_eq!(pr.title, "Fix bug");
        assert_eq!(pr.body, "");
        assert!(pr.diff_url.ends_with("/octo/widgets/pull/42.diff"));
    }

    #[tokio::test]
    async fn test_get_pull_request_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls/9"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), "ghp_test");
        match client.get_pull_request(&repo(), 9).await {
            Err(GitHubError::Status { status, body }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body.contains("Not Found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_diff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/octo/widgets/pull/42.diff"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("--- a/x.py\n+++ b/x.py\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), "ghp_test");
        let diff_url = format!("{}/octo/widgets/pull/42.diff", server.uri());
        let diff = client.get_diff(&diff_url).await.unwrap();
        assert_eq!(diff, "--- a/x.py\n+++ b/x.py\n");
    }

    #[tokio::test]
    async fn test_get_diff_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), "ghp_test");
        let result = client.get_diff(&format!("{}/x.diff", server.uri())).await;
        assert!(matches!(result, Err(GitHubError::Status { status, .. }) if status == StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn test_post_comment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/widgets/issues/42/comments"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(body_json(json!({ "body": "## Review\n\nLooks fine." })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), "ghp_test");
        client
            .post_comment(&repo(), 42, "## Review\n\nLooks fine.")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_post_comment_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Resource not accessible by integration"))
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), "ghp_test");
        let err = client.post_comment(&repo(), 42, "hi").await.unwrap_err();
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("Resource not accessible"));
    }
}
