use eventsource_stream::Eventsource;
use futures::{StreamExt, stream::Stream};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::mock::MockProvider;
use crate::retry::{RetryConfig, is_retryable_status};
use crate::types::*;
use mathcast_core::{ConfigError, Error, ProviderConfig, Result};

/// Generic provider trait for chat-completion backends
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Stream a chat completion
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancellationToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>>;

    /// Short label for logs and `mathcast status`
    fn name(&self) -> &str;
}

/// Provider for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            retry: RetryConfig::default(),
        }
    }

    fn to_openai_request(&self, request: &ChatRequest) -> OpenAiChatRequest {
        OpenAiChatRequest {
            model: self.model.clone(),
            messages: request.messages.clone(),
            stream: true,
        }
    }

    /// Parse one SSE data payload. `None` for chunks that carry no text
    /// (role announcements, finish markers).
    fn parse_chunk(chunk: &str) -> Option<StreamEvent> {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            return None;
        }
        if chunk == "[DONE]" {
            return Some(StreamEvent::Done);
        }

        match serde_json::from_str::<OpenAiChunk>(chunk) {
            Ok(data) => {
                if let Some(error) = data.error {
                    return Some(StreamEvent::Error(format!("OpenAI stream error: {}", error.message)));
                }

                data.choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(StreamEvent::Token)
            }
            Err(_) => Some(StreamEvent::Error(format!("Failed to parse chunk: {}", chunk))),
        }
    }

    /// Send the request, retrying connection failures and retryable statuses.
    /// Nothing has streamed yet at this point, so a retry is invisible to the caller.
    async fn send_with_retry(
        &self, body: &OpenAiChatRequest, cancel_token: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut attempt = 0;

        loop {
            let delay = self.retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying chat request");
                tokio::select! {
                    _ = cancel_token.cancelled() => return Err(Error::provider("Cancelled by user")),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let result = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await;

            let error = match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    let error = Error::provider(format!("OpenAI API error: {} - {}", status, text));
                    if !is_retryable_status(status.as_u16()) {
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    Error::provider(format!("OpenAI request failed (network): {}", e))
                }
                Err(e) => return Err(Error::provider(format!("OpenAI request failed: {}", e))),
            };

            attempt += 1;
            if !self.retry.should_retry(attempt) {
                tracing::warn!(attempts = attempt, error = %error, "giving up on chat request");
                return Err(error);
            }
        }
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancellationToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
        let body = self.to_openai_request(&request);

        let stream = async_stream::stream! {
            if cancel_token.is_cancelled() {
                yield StreamEvent::Error("Cancelled before request".to_string());
                return;
            }

            let response = match self.send_with_retry(&body, &cancel_token).await {
                Ok(resp) => resp,
                Err(e) => {
                    yield StreamEvent::Error(e.to_string());
                    return;
                }
            };

            let eventsource = response.bytes_stream().eventsource();
            tokio::pin!(eventsource);

            while let Some(event_result) = eventsource.next().await {
                if cancel_token.is_cancelled() {
                    yield StreamEvent::Error("Cancelled by user".to_string());
                    return;
                }

                match event_result {
                    Ok(event) => {
                        if let Some(parsed) = OpenAiProvider::parse_chunk(&event.data) {
                            let is_terminal = matches!(parsed, StreamEvent::Done | StreamEvent::Error(_));
                            yield parsed;

                            if is_terminal {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        yield StreamEvent::Error(format!("SSE error: {}", e));
                        return;
                    }
                }
            }

            yield StreamEvent::Done;
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// OpenAI SSE chunk format
#[derive(Debug, Deserialize)]
struct OpenAiChunk {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    delta: OpenAiDelta,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}

/// Factory to create providers from config
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
        match config {
            ProviderConfig::OpenAi { model, base_url, .. } => {
                let api_key = config
                    .resolved_api_key()
                    .ok_or_else(|| Error::Config(ConfigError::MissingApiKey(config.kind().to_string())))?;
                Ok(Arc::new(OpenAiProvider::new(api_key, model.clone(), Some(base_url.clone()))))
            }
            ProviderConfig::Mock { responses_file: Some(path) } => Ok(Arc::new(MockProvider::from_file(path)?)),
            ProviderConfig::Mock { responses_file: None } => Ok(Arc::new(MockProvider::echo())),
        }
    }
}
