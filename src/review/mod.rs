pub mod types;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{Config, ModelSettings};
use types::{Message, MessagesRequest, MessagesResponse, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Model API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Model response contained no text content")]
    EmptyResponse,
}

/// Something that turns a prompt into review text.
#[async_trait]
pub trait ReviewModel: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ReviewError>;
}

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    settings: ModelSettings,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, settings: ModelSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.anthropic_api_key.clone(), config.settings.model.clone())
    }
}

#[async_trait]
impl ReviewModel for AnthropicClient {
    fn name(&self) -> &str {
        &self.settings.name
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.name, prompt_bytes = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ReviewError> {
        let url = format!(
            "{}/v1/messages",
            self.settings.base_url.trim_end_matches('/')
        );
        let request = MessagesRequest {
            model: &self.settings.name,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![Message {
                role: Role::User,
                content: prompt,
            }],
        };

        debug!("sending review request");
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Status { status, body });
        }

        let message = response.json::<MessagesResponse>().await?;
        let review_text = first_text(message)?;
        debug!(review_bytes = review_text.len(), "received review");
        Ok(review_text)
    }
}

/// The first content segment is taken as the whole review.
fn first_text(message: MessagesResponse) -> Result<String, ReviewError> {
    message
        .content
        .into_iter()
        .next()
        .filter(|block| block.kind == "text")
        .and_then(|block| block.text)
        .filter(|text| !text.is_empty())
        .ok_or(ReviewError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AnthropicClient {
        let settings = ModelSettings {
            base_url: server.uri(),
            ..ModelSettings::default()
        };
        AnthropicClient::new("sk-ant-test", settings)
    }

    #[tokio::test]
    async fn test_complete_returns_first_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 1200,
                "messages": [{ "role": "user", "content": "Review this diff" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "Summary: looks fine." },
                    { "type": "text", "text": "ignored" },
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let review = client_for(&server).complete("Review this diff").await.unwrap();
        assert_eq!(review, "Summary: looks fine.");
    }

    #[tokio::test]
    async fn test_complete_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("p").await;
        assert!(matches!(result, Err(ReviewError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_complete_non_text_first_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "tool_use", "id": "t1", "name": "x", "input": {} }],
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("p").await;
        assert!(matches!(result, Err(ReviewError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        match client_for(&server).complete("p").await {
            Err(ReviewError::Status { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "invalid x-api-key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_name_is_model_identifier() {
        let client = AnthropicClient::new("k", ModelSettings::default());
        assert_eq!(client.name(), "claude-3-5-sonnet-20241022");
    }
}
