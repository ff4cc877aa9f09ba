use crate::media::MediaKind;

/// Actions that can be triggered by key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Submit the composed message
    SendMessage { message: String },
    /// Start a fresh chat (Ctrl+N)
    NewChat,
    /// Toggle light/dark theme (Ctrl+T)
    ToggleTheme,
    /// Switch between Conceptual and Technical tabs
    SwitchTab,
    PageUp,
    PageDown,
    /// Copy a media panel's source to the download directory
    Download { kind: MediaKind },
    /// Abandon the streaming reply
    CancelStreaming,
    /// Exit the TUI application
    Exit,
}
