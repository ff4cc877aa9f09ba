use crate::state::{ChatTab, UiState};
use crate::theme::ThemePalette;

use mathcast_core::{Message, Role};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub const THINKING: &str = "Thinking...";
pub const TECHNICAL_PLACEHOLDER: &str = "Technical explanations will appear here.";

/// Bubbles take at most this share of the column width
const BUBBLE_WIDTH_PERCENT: usize = 75;

/// Tab bar above the transcript
pub struct ChatTabs {
    active: ChatTab,
    palette: ThemePalette,
}

impl ChatTabs {
    pub fn new(active: ChatTab, palette: ThemePalette) -> Self {
        Self { active, palette }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::new();
        for tab in ChatTab::VALUES {
            let style = if *tab == self.active {
                Style::default()
                    .fg(self.palette.blue)
                    .bg(self.palette.active)
                    .add_modifier(Modifier::BOLD)
            } else {
                self.palette.muted()
            };
            spans.push(Span::styled(format!(" {} ", tab.title()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).style(self.palette.base()), area);
    }
}

/// Message bubbles of the active chat
pub struct ChatView<'a> {
    messages: &'a [Message],
    streaming: bool,
    error: Option<&'a str>,
    ui: &'a UiState,
    palette: ThemePalette,
}

impl<'a> ChatView<'a> {
    pub fn new(
        messages: &'a [Message], streaming: bool, error: Option<&'a str>, ui: &'a UiState, palette: ThemePalette,
    ) -> Self {
        Self { messages, streaming, error, ui, palette }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.ui.tab == ChatTab::Technical {
            let placeholder = Paragraph::new(Line::from(Span::styled(TECHNICAL_PLACEHOLDER, self.palette.muted())))
                .alignment(Alignment::Center)
                .style(self.palette.base());
            frame.render_widget(placeholder, area);
            return;
        }

        let lines = self.lines(area.width as usize);
        let offset = scroll_offset(lines.len(), area.height as usize, self.ui.scroll_from_bottom as usize);
        let paragraph = Paragraph::new(lines).style(self.palette.base()).scroll((offset, 0));
        frame.render_widget(paragraph, area);
    }

    /// Wrapped transcript lines for a column of `width` cells
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let bubble_width = (width * BUBBLE_WIDTH_PERCENT / 100).max(8);
        let mut lines = Vec::new();

        for (index, message) in self.messages.iter().enumerate() {
            let live = self.streaming && index + 1 == self.messages.len();
            match message.role {
                Role::User => self.push_user(&message.content, bubble_width, &mut lines),
                Role::Assistant => self.push_assistant(&message.content, bubble_width, live, &mut lines),
                Role::System => continue,
            }
            lines.push(Line::default());
        }

        if self.streaming && !self.messages.last().is_some_and(Message::is_assistant) {
            lines.push(Line::from(Span::styled(
                THINKING,
                self.palette.muted().add_modifier(Modifier::ITALIC),
            )));
        }

        if let Some(error) = self.error {
            lines.push(Line::from(Span::styled(format!("Error: {error}"), self.palette.error())));
        }

        lines
    }

    fn push_user(&self, content: &str, width: usize, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(Span::styled("You", self.palette.muted())).alignment(Alignment::Right));
        for row in wrap(content, width.saturating_sub(2)) {
            lines.push(
                Line::from(Span::styled(format!(" {row} "), self.palette.user_bubble())).alignment(Alignment::Right),
            );
        }
    }

    fn push_assistant(&self, content: &str, width: usize, live: bool, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(Span::styled("Assistant", Style::default().fg(self.palette.cyan))));
        for row in wrap(content, width.saturating_sub(2)) {
            lines.push(Line::from(Span::styled(format!(" {row} "), self.palette.assistant_bubble())));
        }
        if live {
            lines.push(Line::from(Span::styled("▌", self.palette.muted())));
        }
    }
}

fn wrap(content: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for source in content.lines() {
        if source.is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(textwrap::wrap(source, width).into_iter().map(|row| row.into_owned()));
    }
    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

/// Top row to show so that `from_bottom` lines are hidden below the viewport
fn scroll_offset(total: usize, visible: usize, from_bottom: usize) -> u16 {
    let max_offset = total.saturating_sub(visible);
    let offset = max_offset.saturating_sub(from_bottom.min(max_offset));
    u16::try_from(offset).unwrap_or(u16::MAX)
}
