//! Session view model: the single source of truth for which chat is active,
//! what the screen shows, and which palette is in use.
//!
//! All mutation goes through the operations on [`SessionViewModel`]. The
//! transport collaborator is owned here so that every interaction turn sees a
//! consistent pair of (view state, live buffer).

use crate::config::ConfigError;
use crate::session::{ChatId, ChatIdAllocator, ChatSession};
use crate::transport::Transport;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the main area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Only the centered prompt box
    #[default]
    Initial,
    /// Two-pane layout: chat on one side, media panels on the other
    Conversation,
}

/// Presentation theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(ConfigError::InvalidTheme(s.to_string())),
        }
    }
}

/// Result of a submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft was handed to the transport
    Sent,
    /// Empty or whitespace-only draft; nothing changed
    EmptyDraft,
}

/// Page-wide view state
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    sessions: Vec<ChatSession>,
    active: Option<ChatId>,
    mode: ViewMode,
    theme: ThemeMode,
}

/// Mediates between user actions and the transport collaborator
pub struct SessionViewModel<T: Transport> {
    state: ViewState,
    ids: ChatIdAllocator,
    transport: T,
}

impl<T: Transport> SessionViewModel<T> {
    pub fn new(transport: T) -> Self {
        Self::with_theme(transport, ThemeMode::default())
    }

    pub fn with_theme(transport: T, theme: ThemeMode) -> Self {
        Self { state: ViewState { theme, ..ViewState::default() }, ids: ChatIdAllocator::new(), transport }
    }

    /// Create the first session if none exists yet. Safe to call repeatedly.
    pub fn initialize(&mut self) {
        if self.state.sessions.is_empty() {
            self.create_session();
        }
    }

    /// Start a fresh chat and make it active
    pub fn create_session(&mut self) -> ChatId {
        let session = ChatSession::new(self.ids.next());
        let id = session.id;

        self.state.sessions.push(session);
        self.state.active = Some(id);
        self.transport.reset();
        self.state.mode = ViewMode::Initial;

        tracing::debug!(chat_id = %id, sessions = self.state.sessions.len(), "created chat session");
        id
    }

    /// Flip between light and dark, returning the new theme
    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.state.theme = self.state.theme.toggled();
        tracing::debug!(theme = %self.state.theme, "theme toggled");
        self.state.theme
    }

    /// Submit `text` as the next user message of the active session
    pub fn submit_message(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            tracing::trace!("ignoring empty draft");
            return SubmitOutcome::EmptyDraft;
        }

        if self.state.mode == ViewMode::Initial {
            self.state.mode = ViewMode::Conversation;
        }

        if let Some(session) = self.active_session_mut()
            && session.title_from_first_message(text)
        {
            tracing::debug!(chat_id = %session.id, title = %session.title, "chat titled");
        }

        self.transport.set_draft(text.to_string());
        self.transport.submit();
        self.sync_active_transcript();

        SubmitOutcome::Sent
    }

    /// Run one collaborator turn (e.g. applying a streamed update), then
    /// copy the live buffer down into the active session.
    pub fn transport_turn<R>(&mut self, turn: impl FnOnce(&mut T) -> R) -> R {
        let result = turn(&mut self.transport);
        self.sync_active_transcript();
        result
    }

    fn sync_active_transcript(&mut self) {
        let snapshot = self.transport.messages().to_vec();
        if let Some(session) = self.active_session_mut() {
            session.transcript = snapshot;
        }
    }

    fn active_session_mut(&mut self) -> Option<&mut ChatSession> {
        let active = self.state.active?;
        self.state.sessions.iter_mut().find(|s| s.id == active)
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.state.sessions
    }

    pub fn active_id(&self) -> Option<ChatId> {
        self.state.active
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        let active = self.state.active?;
        self.state.sessions.iter().find(|s| s.id == active)
    }

    pub fn mode(&self) -> ViewMode {
        self.state.mode
    }

    pub fn theme(&self) -> ThemeMode {
        self.state.theme
    }

    /// Media panels are shown only alongside a conversation
    pub fn panels_visible(&self) -> bool {
        self.state.mode == ViewMode::Conversation
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Draft edits go straight to the transport's draft slot
    pub fn set_draft(&mut self, draft: String) {
        self.transport.set_draft(draft);
    }
}
