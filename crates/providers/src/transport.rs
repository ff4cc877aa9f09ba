//! The chat transport: owns the draft and the live message buffer, runs each
//! exchange on the tokio runtime and folds streamed progress back in.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::adapter::Provider;
use crate::types::*;
use mathcast_core::logging::{PrivacyConfig, redact_message};
use mathcast_core::{ChatConfig, Message, MessageId, Transport};

/// Concrete transport collaborator backed by a streaming [`Provider`].
///
/// Updates are delivered through the receiver returned by [`ChatTransport::new`];
/// the owner feeds each one back through [`ChatTransport::apply`].
pub struct ChatTransport {
    provider: Arc<dyn Provider>,
    chat: ChatConfig,
    privacy: PrivacyConfig,
    draft: String,
    buffer: Vec<Message>,
    error: Option<String>,
    epoch: u64,
    streaming: bool,
    cancel: CancellationToken,
    updates: UnboundedSender<TransportUpdate>,
}

impl ChatTransport {
    pub fn new(provider: Arc<dyn Provider>, chat: ChatConfig) -> (Self, UnboundedReceiver<TransportUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let transport = Self {
            provider,
            chat,
            privacy: PrivacyConfig::default(),
            draft: String::new(),
            buffer: Vec::new(),
            error: None,
            epoch: 0,
            streaming: false,
            cancel: CancellationToken::new(),
            updates,
        };
        (transport, rx)
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    /// Current exchange generation
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fold one streamed update into the live buffer.
    ///
    /// Returns `false` when the update belongs to an abandoned exchange and was dropped.
    pub fn apply(&mut self, update: TransportUpdate) -> bool {
        if update.epoch != self.epoch {
            tracing::trace!(update_epoch = update.epoch, epoch = self.epoch, "dropping stale transport update");
            return false;
        }

        match update.event {
            TransportEvent::Started { message_id } => {
                self.buffer.push(Message::assistant("").with_id(message_id));
            }
            TransportEvent::Delta { message_id, text } => match self.buffer.iter_mut().rev().find(|m| m.id == message_id) {
                Some(message) => message.content.push_str(&text),
                None => self.buffer.push(Message::assistant(text).with_id(message_id)),
            },
            TransportEvent::Finished => {
                self.streaming = false;
                tracing::debug!(epoch = self.epoch, messages = self.buffer.len(), "exchange finished");
            }
            TransportEvent::Failed { error } => {
                self.streaming = false;
                tracing::warn!(epoch = self.epoch, error = %error, "exchange failed");
                self.error = Some(error);
            }
        }
        true
    }

    /// Abandon the in-flight exchange, keeping whatever already streamed
    pub fn cancel(&mut self) -> bool {
        if !self.streaming {
            return false;
        }
        self.cancel.cancel();
        self.epoch += 1;
        self.streaming = false;
        tracing::debug!(epoch = self.epoch, "exchange cancelled");
        true
    }

    /// System prompt followed by the most recent `context_limit` messages
    pub(crate) fn build_request(&self) -> ChatRequest {
        let history: Vec<&Message> = self.buffer.iter().filter(|m| !m.content.is_empty()).collect();
        let start = history.len().saturating_sub(self.chat.context_limit);

        let mut messages = Vec::with_capacity(history.len() - start + 1);
        if !self.chat.system_prompt.trim().is_empty() {
            messages.push(ChatMessage::system(&self.chat.system_prompt));
        }
        messages.extend(history[start..].iter().map(|m| ChatMessage::from(*m)));

        ChatRequest::builder().messages(messages).build()
    }

    fn start_exchange(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.epoch += 1;
        self.error = None;

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.error = Some(format!("no async runtime available: {}", e));
                return;
            }
        };

        let exchange = Exchange {
            provider: Arc::clone(&self.provider),
            request: self.build_request(),
            epoch: self.epoch,
            cancel: self.cancel.clone(),
            updates: self.updates.clone(),
        };
        self.streaming = true;
        handle.spawn(exchange.run());
    }
}

impl Transport for ChatTransport {
    fn draft(&self) -> &str {
        &self.draft
    }

    fn set_draft(&mut self, draft: String) {
        self.draft = draft;
    }

    fn submit(&mut self) {
        let text = std::mem::take(&mut self.draft);
        if text.trim().is_empty() {
            return;
        }

        tracing::info!(
            provider = self.provider.name(),
            content = %redact_message(&text, &self.privacy),
            "submitting message"
        );
        self.buffer.push(Message::user(text));
        self.start_exchange();
    }

    fn messages(&self) -> &[Message] {
        &self.buffer
    }

    fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.epoch += 1;
        self.streaming = false;
        self.buffer.clear();
        self.draft.clear();
        self.error = None;
        tracing::debug!(epoch = self.epoch, "transport reset");
    }

    fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }
}

/// One spawned request/response exchange
struct Exchange {
    provider: Arc<dyn Provider>,
    request: ChatRequest,
    epoch: u64,
    cancel: CancellationToken,
    updates: UnboundedSender<TransportUpdate>,
}

impl Exchange {
    fn send(&self, event: TransportEvent) -> bool {
        self.updates.send(TransportUpdate { epoch: self.epoch, event }).is_ok()
    }

    async fn run(self) {
        let request = self.request.clone();
        let mut stream = match self.provider.stream_chat(request, self.cancel.clone()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.send(TransportEvent::Failed { error: e.to_string() });
                return;
            }
        };

        let message_id = MessageId::new();
        let mut started = false;

        loop {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => return,
                event = stream.next() => event,
            };

            let delivered = match event {
                Some(StreamEvent::Token(text)) => {
                    if !started {
                        started = true;
                        if !self.send(TransportEvent::Started { message_id: message_id.clone() }) {
                            return;
                        }
                    }
                    self.send(TransportEvent::Delta { message_id: message_id.clone(), text })
                }
                Some(StreamEvent::Done) | None => {
                    self.send(TransportEvent::Finished);
                    return;
                }
                Some(StreamEvent::Error(error)) => {
                    self.send(TransportEvent::Failed { error });
                    return;
                }
            };

            if !delivered {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockEvent, MockProvider, MockResponse};
    use mathcast_core::{Role, SessionViewModel, SubmitOutcome};
    use std::time::Duration;

    fn chat(context_limit: usize) -> ChatConfig {
        ChatConfig { system_prompt: "You are a math teacher.".to_string(), context_limit }
    }

    fn transport(responses: Vec<MockResponse>) -> (ChatTransport, UnboundedReceiver<TransportUpdate>) {
        ChatTransport::new(Arc::new(MockProvider::new(responses)), chat(5))
    }

    async fn drain(transport: &mut ChatTransport, rx: &mut UnboundedReceiver<TransportUpdate>) {
        while transport.is_streaming() {
            let update = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("exchange timed out")
                .expect("channel closed");
            transport.apply(update);
        }
    }

    #[tokio::test]
    async fn test_submit_streams_reply() {
        let (mut transport, mut rx) = transport(vec![MockResponse::Text { content: "Pi is about 3.14".to_string() }]);

        transport.set_draft("What is pi?".to_string());
        transport.submit();
        assert!(transport.draft().is_empty());
        assert!(transport.is_streaming());
        assert_eq!(transport.messages().len(), 1);

        drain(&mut transport, &mut rx).await;

        let messages = transport.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Pi is about 3.14");
        assert_eq!(transport.last_error(), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_reply() {
        let (mut transport, mut rx) = transport(vec![MockResponse::Sequence {
            events: vec![
                MockEvent::Token { text: "The chain".to_string() },
                MockEvent::Error { message: "connection reset".to_string() },
            ],
        }]);

        transport.set_draft("Explain the chain rule".to_string());
        transport.submit();
        drain(&mut transport, &mut rx).await;

        assert_eq!(transport.messages().len(), 2);
        assert_eq!(transport.messages()[1].content, "The chain");
        assert_eq!(transport.last_error(), Some("connection reset"));
    }

    #[tokio::test]
    async fn test_failure_before_first_token() {
        let (mut transport, mut rx) = transport(vec![MockResponse::Error { message: "401 Unauthorized".to_string() }]);

        transport.set_draft("hello".to_string());
        transport.submit();
        drain(&mut transport, &mut rx).await;

        assert_eq!(transport.messages().len(), 1);
        assert_eq!(transport.last_error(), Some("401 Unauthorized"));
    }

    #[tokio::test]
    async fn test_reset_drops_stale_updates() {
        let (mut transport, _rx) = transport(vec![]);
        let stale = transport.epoch();

        transport.reset();
        let applied = transport.apply(TransportUpdate {
            epoch: stale,
            event: TransportEvent::Delta { message_id: MessageId::new(), text: "late".to_string() },
        });

        assert!(!applied);
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn test_reset_during_exchange() {
        let provider = MockProvider::new(vec![MockResponse::Text { content: "a slow answer".to_string() }])
            .with_token_delay(Duration::from_millis(20));
        let (mut transport, mut rx) = ChatTransport::new(Arc::new(provider), chat(5));

        transport.set_draft("slow question".to_string());
        transport.submit();
        transport.reset();

        assert!(!transport.is_streaming());
        assert!(transport.messages().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        while let Ok(update) = rx.try_recv() {
            assert!(!transport.apply(update));
        }
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_keeps_buffer() {
        let provider = MockProvider::new(vec![MockResponse::Text { content: "never finished".to_string() }])
            .with_token_delay(Duration::from_millis(50));
        let (mut transport, _rx) = ChatTransport::new(Arc::new(provider), chat(5));

        transport.set_draft("question".to_string());
        transport.submit();
        assert!(transport.cancel());
        assert!(!transport.cancel());

        assert!(!transport.is_streaming());
        assert_eq!(transport.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_draft_not_sent() {
        let (mut transport, _rx) = transport(vec![]);
        transport.set_draft("   ".to_string());
        transport.submit();

        assert!(transport.messages().is_empty());
        assert!(!transport.is_streaming());
    }

    #[test]
    fn test_context_window() {
        let (mut transport, _rx) = ChatTransport::new(Arc::new(MockProvider::echo()), chat(3));
        let epoch = transport.epoch();
        for i in 0..4 {
            transport.buffer.push(Message::user(format!("q{}", i)));
            transport.apply(TransportUpdate {
                epoch,
                event: TransportEvent::Delta { message_id: MessageId::new(), text: format!("a{}", i) },
            });
        }

        let request = transport.build_request();
        let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["You are a math teacher.", "a2", "q3", "a3"]);
        assert_eq!(request.messages[0].role, Role::System);
    }

    #[test]
    fn test_submit_without_runtime_records_error() {
        let (mut transport, _rx) = transport(vec![]);
        transport.set_draft("hello".to_string());
        transport.submit();

        assert_eq!(transport.messages().len(), 1);
        assert!(!transport.is_streaming());
        assert!(transport.last_error().unwrap().starts_with("no async runtime"));
    }

    #[tokio::test]
    async fn test_view_model_over_chat_transport() {
        let (transport, mut rx) = transport(vec![MockResponse::Text { content: "A limit is...".to_string() }]);
        let mut vm = SessionViewModel::new(transport);
        vm.initialize();

        assert_eq!(vm.submit_message("What is a limit?"), SubmitOutcome::Sent);
        while vm.transport().is_streaming() {
            let update = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
            vm.transport_turn(|t| t.apply(update));
        }

        let session = vm.active_session().unwrap();
        assert_eq!(session.title, "What is a limit?...");
        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[1].content, "A limit is...");

        vm.create_session();
        assert!(vm.transport().messages().is_empty());
        assert!(vm.active_session().unwrap().transcript.is_empty());
    }
}
