use crate::message::Message;

use std::fmt;

/// Title every session starts with until its first message is sent
pub const DEFAULT_TITLE: &str = "New Chat";

/// Number of characters of the first message kept in a derived title
pub const TITLE_LENGTH: usize = 30;

/// Marker appended to derived titles
pub const TITLE_ELLIPSIS: &str = "...";

/// Opaque chat identifier derived from the creation timestamp (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(i64);

impl ChatId {
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out timestamp-derived chat ids that are strictly increasing.
///
/// Two sessions created within the same millisecond (or after the clock moved
/// backwards) still receive distinct ids.
#[derive(Debug, Default, Clone)]
pub struct ChatIdAllocator {
    last: Option<i64>,
}

impl ChatIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id from the current wall clock
    pub fn next(&mut self) -> ChatId {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    /// Allocate an id for the given timestamp, bumping past the last one if needed
    pub fn next_at(&mut self, millis: i64) -> ChatId {
        let id = match self.last {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last = Some(id);
        ChatId(id)
    }
}

/// One independent conversation thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: ChatId,
    pub title: String,
    pub transcript: Vec<Message>,
}

impl ChatSession {
    pub fn new(id: ChatId) -> Self {
        Self { id, title: DEFAULT_TITLE.to_string(), transcript: Vec::new() }
    }

    /// Whether the title is still the sentinel default
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Set the title from the first submitted text; later calls are ignored
    pub fn title_from_first_message(&mut self, text: &str) -> bool {
        if !self.has_default_title() {
            return false;
        }
        self.title = derive_title(text);
        true
    }
}

/// First [`TITLE_LENGTH`] characters of `text` followed by [`TITLE_ELLIPSIS`]
pub fn derive_title(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_LENGTH).collect();
    title.push_str(TITLE_ELLIPSIS);
    title
}
