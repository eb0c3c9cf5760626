use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::CompletionConfig;

const API_VERSION: &str = "2024-02-15-preview";
const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You are an expert software engineer who writes comprehensive, \
    well-formatted documentation for code. Always provide clear, professional documentation \
    that follows best practices for the given programming language.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the chat-completions endpoint of an Azure OpenAI deployment.
///
/// Sends a single attempt per call, bounded by a 60 second timeout. The API
/// key travels in the `api-key` header, never in the body.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Unexpected(format!("failed to build client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            API_VERSION
        )
    }

    /// Generate text for `prompt`. Returns the raw completion content;
    /// trimming is the caller's concern.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request_body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(
            "Calling completion API with deployment: {}",
            self.config.deployment
        );

        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            error!("Completion request failed with status: {}", status);
            return Err(CompletionError::Request(format!(
                "upstream returned status {}",
                status
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                error!("No completion choices in upstream response");
                CompletionError::MalformedResponse("no choices in response".to_string())
            })?;

        info!(
            "Successfully generated documentation ({} characters)",
            content.chars().count()
        );
        Ok(content)
    }
}

fn classify_send_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        error!("Completion request timed out");
        CompletionError::Timeout
    } else if err.is_connect() || err.is_request() {
        error!("Completion request failed: {}", err);
        CompletionError::Request(err.to_string())
    } else {
        error!("Unexpected error calling completion API: {}", err);
        CompletionError::Unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(endpoint: &str) -> CompletionClient {
        CompletionClient::new(CompletionConfig {
            api_key: "test-key".to_string(),
            endpoint: endpoint.to_string(),
            deployment: "gpt-4".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_completions_url() {
        let client = client("https://example.openai.azure.com/");
        assert_eq!(
            client.completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[tokio::test]
    async fn test_complete_returns_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/deployments/gpt-4/chat/completions")
                    .query_param("api-version", API_VERSION)
                    .header("api-key", "test-key")
                    .json_body_includes(
                        json!({"max_tokens": 4000, "temperature": 0.3}).to_string(),
                    );
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "/// Adds two numbers."}}]
                }));
            })
            .await;

        let result = client(&server.base_url()).complete("document this").await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "/// Adds two numbers.");
    }

    #[tokio::test]
    async fn test_complete_fails_on_empty_choices() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let result = client(&server.base_url()).complete("document this").await;
        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_complete_fails_on_missing_content_field() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(json!({"choices": [{"message": {"role": "assistant"}}]}));
            })
            .await;

        let result = client(&server.base_url()).complete("document this").await;
        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_complete_fails_on_upstream_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500).body("internal error");
            })
            .await;

        let result = client(&server.base_url()).complete("document this").await;
        match result {
            Err(CompletionError::Request(msg)) => {
                assert!(msg.contains("500"), "message should name the status: {}", msg)
            }
            other => panic!("expected Request error, got {:?}", other.map(|_| ())),
        }
    }
}
