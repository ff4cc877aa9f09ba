use crate::state::InputState;
use crate::theme::ThemePalette;

use mathcast_core::ViewMode;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

pub const INITIAL_PLACEHOLDER: &str = "Ask anything...";
pub const CONVERSATION_PLACEHOLDER: &str = "Type your message...";

/// Bordered single-line prompt box
pub struct InputBox<'a> {
    input: &'a InputState,
    mode: ViewMode,
    palette: ThemePalette,
}

impl<'a> InputBox<'a> {
    pub fn new(input: &'a InputState, mode: ViewMode, palette: ThemePalette) -> Self {
        Self { input, mode, palette }
    }

    fn placeholder(&self) -> &'static str {
        match self.mode {
            ViewMode::Initial => INITIAL_PLACEHOLDER,
            ViewMode::Conversation => CONVERSATION_PLACEHOLDER,
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.palette.border())
            .style(self.palette.panel());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.input.buffer.is_empty() {
            let line = Line::from(Span::styled(self.placeholder(), self.palette.muted()));
            frame.render_widget(Paragraph::new(line).style(self.palette.panel()), inner);
            frame.set_cursor_position(Position::new(inner.x, inner.y));
            return;
        }

        let (text, cursor) = visible_window(self.input, inner.width);
        frame.render_widget(Paragraph::new(Line::from(Span::raw(text))).style(self.palette.panel()), inner);
        frame.set_cursor_position(Position::new(inner.x + cursor, inner.y));
    }
}

/// Slice of the buffer that fits in `width` columns with the cursor in view
///
/// Returns the text to draw and the cursor column relative to its start. The
/// window scrolls only as far as needed to keep the cursor inside the box.
pub fn visible_window(input: &InputState, width: u16) -> (String, u16) {
    let width = usize::from(width);
    if width == 0 {
        return (String::new(), 0);
    }

    let widths: Vec<(char, usize)> = input.buffer.chars().map(|c| (c, c.width().unwrap_or(0))).collect();
    let cursor = input.cursor.min(widths.len());

    let mut start = 0;
    let mut before: usize = widths[..cursor].iter().map(|(_, w)| w).sum();
    while before > width - 1 && start < cursor {
        before -= widths[start].1;
        start += 1;
    }

    let mut used = 0;
    let text = widths[start..]
        .iter()
        .take_while(|(_, w)| {
            used += w;
            used <= width
        })
        .map(|(c, _)| c)
        .collect();

    (text, u16::try_from(before).unwrap_or(u16::MAX))
}
