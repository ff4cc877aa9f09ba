use mathcast_core::{Message, MessageId, Role};
use serde::{Deserialize, Serialize};

/// A single message on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self { role: message.role, content: message.content.clone() }
    }
}

/// A request to a chat provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }

    /// Content of the most recent user message, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[derive(Default)]
pub struct ChatRequestBuilder {
    messages: Vec<ChatMessage>,
}

impl ChatRequestBuilder {
    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn add_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn build(self) -> ChatRequest {
        ChatRequest { messages: self.messages }
    }
}

/// Events from streaming responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StreamEvent {
    /// A single token or chunk of content
    Token(String),
    /// End of stream
    Done,
    /// An error occurred during streaming
    Error(String),
}

/// Progress of one exchange, as seen by the transport.
///
/// `epoch` identifies the exchange generation; updates from an exchange that
/// was abandoned carry an old epoch and are dropped on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportUpdate {
    pub epoch: u64,
    pub event: TransportEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The assistant reply has begun
    Started { message_id: MessageId },
    /// More text for the assistant reply
    Delta { message_id: MessageId, text: String },
    /// The exchange completed normally
    Finished,
    /// The exchange failed; any partial reply stays in the buffer
    Failed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::builder()
            .messages(vec![ChatMessage::system("sys")])
            .add_message(ChatMessage::user("Hello"))
            .build();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "Hello");
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_string(&ChatMessage::system("Be brief")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"Be brief"}"#);
    }

    #[test]
    fn test_last_user_content() {
        let request = ChatRequest::builder()
            .add_message(ChatMessage::system("sys"))
            .add_message(ChatMessage::user("first"))
            .add_message(ChatMessage::assistant("reply"))
            .add_message(ChatMessage::user("second"))
            .build();
        assert_eq!(request.last_user_content(), Some("second"));
        assert_eq!(ChatRequest::default().last_user_content(), None);
    }

    #[test]
    fn test_chat_message_from_core_message() {
        let message = Message::assistant("Pi is irrational");
        let wire = ChatMessage::from(&message);
        assert_eq!(wire, ChatMessage::assistant("Pi is irrational"));
    }
}
