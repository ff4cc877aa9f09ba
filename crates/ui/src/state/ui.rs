/// Chat tabs above the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatTab {
    #[default]
    Conceptual,
    Technical,
}

impl ChatTab {
    pub const VALUES: &[ChatTab] = &[ChatTab::Conceptual, ChatTab::Technical];

    pub fn title(&self) -> &'static str {
        match self {
            ChatTab::Conceptual => "Conceptual",
            ChatTab::Technical => "Technical",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChatTab::Conceptual => ChatTab::Technical,
            ChatTab::Technical => ChatTab::Conceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// One-line message shown in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// Presentation state that lives only in the terminal host
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tab: ChatTab,
    /// Lines scrolled up from the newest message; 0 follows the stream
    pub scroll_from_bottom: u16,
    pub status: Option<StatusMessage>,
}

impl UiState {
    pub fn switch_tab(&mut self) {
        self.tab = self.tab.next();
        self.scroll_from_bottom = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), kind: StatusKind::Info });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), kind: StatusKind::Error });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}
