use crate::Provider;
use crate::types::*;
use mathcast_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

/// Scripted reply for offline runs and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockResponse {
    Text { content: String },
    Error { message: String },
    Sequence { events: Vec<MockEvent> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum MockEvent {
    Token { text: String },
    Error { message: String },
    Done,
}

/// Mock configuration from TOML file
#[derive(Debug, Deserialize)]
struct MockConfig {
    responses: Vec<MockResponse>,
}

/// Mock provider for deterministic runs without API calls.
///
/// Scripted responses are handed out in order, one per request. With no
/// script at all the provider echoes the last user message back.
pub struct MockProvider {
    responses: Vec<MockResponse>,
    current: AtomicUsize,
    token_delay: Duration,
}

impl MockProvider {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self { responses, current: AtomicUsize::new(0), token_delay: Duration::ZERO }
    }

    /// Provider that replies with the question it was asked
    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MockConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(Self::new(config.responses))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let provider = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), responses = provider.responses.len(), "loaded mock responses");
        Ok(provider)
    }

    /// Pause between streamed tokens
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = delay;
        self
    }

    fn next_response(&self, request: &ChatRequest) -> MockResponse {
        if self.responses.is_empty() {
            let question = request.last_user_content().unwrap_or_default();
            return MockResponse::Text { content: format!("You asked: {}", question) };
        }

        let index = self.current.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(index) {
            Some(response) => response.clone(),
            None => MockResponse::Text {
                content: format!(
                    "No more mock responses configured (requested: {}, available: {})",
                    index + 1,
                    self.responses.len()
                ),
            },
        }
    }

    fn into_events(response: MockResponse) -> Vec<StreamEvent> {
        match response {
            MockResponse::Text { content } => {
                let mut events: Vec<StreamEvent> =
                    content.split_inclusive(' ').map(|word| StreamEvent::Token(word.to_string())).collect();
                events.push(StreamEvent::Done);
                events
            }
            MockResponse::Error { message } => vec![StreamEvent::Error(message)],
            MockResponse::Sequence { events } => {
                let mut out = Vec::with_capacity(events.len() + 1);
                for event in events {
                    match event {
                        MockEvent::Token { text } => out.push(StreamEvent::Token(text)),
                        MockEvent::Error { message } => {
                            out.push(StreamEvent::Error(message));
                            return out;
                        }
                        MockEvent::Done => break,
                    }
                }
                out.push(StreamEvent::Done);
                out
            }
        }
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancellationToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
        let events = Self::into_events(self.next_response(&request));
        let delay = self.token_delay;

        let stream = async_stream::stream! {
            for event in events {
                if !delay.is_zero() {
                    tokio::select! {
                        _ = cancel_token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if cancel_token.is_cancelled() {
                    yield StreamEvent::Error("Cancelled by user".to_string());
                    return;
                }
                yield event;
            }
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn collect(provider: &MockProvider, question: &str) -> Vec<StreamEvent> {
        let request = ChatRequest::builder().add_message(ChatMessage::user(question)).build();
        let stream = provider.stream_chat(request, CancellationToken::new()).await.unwrap();
        stream.collect().await
    }

    #[test]
    fn test_mock_response_parsing() {
        let toml = r#"
[[responses]]
type = "text"
content = "Hello, world!"

[[responses]]
type = "error"
message = "rate limit"

[[responses]]
type = "sequence"
events = [
    { event = "token", text = "Partial" },
    { event = "done" }
]
"#;

        let provider = MockProvider::from_toml_str(toml).unwrap();
        assert_eq!(provider.responses.len(), 3);
        assert!(matches!(provider.responses[0], MockResponse::Text { .. }));
        assert!(matches!(provider.responses[1], MockResponse::Error { .. }));
        assert!(matches!(provider.responses[2], MockResponse::Sequence { .. }));
    }

    #[test]
    fn test_mock_response_parse_error() {
        let err = MockProvider::from_toml_str("[[responses]]\ntype = \"video\"\n").err().unwrap();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replies.toml");
        std::fs::write(&path, "[[responses]]\ntype = \"text\"\ncontent = \"Hi\"\n").unwrap();

        let provider = MockProvider::from_file(&path).unwrap();
        assert_eq!(provider.responses, vec![MockResponse::Text { content: "Hi".to_string() }]);

        assert!(MockProvider::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[tokio::test]
    async fn test_echo() {
        let provider = MockProvider::echo();
        let events = collect(&provider, "what is pi").await;

        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Token(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "You asked: what is pi");
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_scripted_in_order_then_exhausted() {
        let provider = MockProvider::new(vec![
            MockResponse::Text { content: "one".to_string() },
            MockResponse::Error { message: "boom".to_string() },
        ]);

        assert_eq!(collect(&provider, "q").await, vec![StreamEvent::Token("one".to_string()), StreamEvent::Done]);
        assert_eq!(collect(&provider, "q").await, vec![StreamEvent::Error("boom".to_string())]);

        let events = collect(&provider, "q").await;
        assert!(matches!(&events[0], StreamEvent::Token(t) if t.starts_with("No ")));
    }

    #[tokio::test]
    async fn test_sequence_stops_at_error() {
        let provider = MockProvider::new(vec![MockResponse::Sequence {
            events: vec![
                MockEvent::Token { text: "The chain".to_string() },
                MockEvent::Error { message: "connection reset".to_string() },
                MockEvent::Token { text: "never".to_string() },
            ],
        }]);

        let events = collect(&provider, "q").await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("The chain".to_string()),
                StreamEvent::Error("connection reset".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_stream() {
        let provider = MockProvider::new(vec![MockResponse::Text { content: "a b c".to_string() }]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = ChatRequest::builder().add_message(ChatMessage::user("q")).build();
        let events: Vec<StreamEvent> = provider.stream_chat(request, cancel).await.unwrap().collect().await;
        assert_eq!(events, vec![StreamEvent::Error("Cancelled by user".to_string())]);
    }
}
