use crate::state::{StatusKind, StatusMessage};
use crate::theme::ThemePalette;

use mathcast_core::ViewMode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// Footer: status message on the left, key hints on the right
pub struct Footer<'a> {
    status: Option<&'a StatusMessage>,
    mode: ViewMode,
    streaming: bool,
    palette: ThemePalette,
}

impl<'a> Footer<'a> {
    pub fn new(status: Option<&'a StatusMessage>, mode: ViewMode, streaming: bool, palette: ThemePalette) -> Self {
        Self { status, mode, streaming, palette }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let hints = self.hints();
        let hints_width: u16 = hints.iter().map(|(k, d)| (k.len() + d.len() + 3) as u16).sum();

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(hints_width.min(area.width))])
            .split(area);

        if let Some(status) = self.status {
            let style = match status.kind {
                StatusKind::Info => self.palette.success(),
                StatusKind::Error => self.palette.error(),
            };
            let line = Line::from(Span::styled(format!(" {}", status.text), style));
            frame.render_widget(Paragraph::new(line).style(self.palette.panel()), columns[0]);
        } else {
            frame.render_widget(Paragraph::new("").style(self.palette.panel()), columns[0]);
        }

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(format!("[{key}]"), Style::default().fg(self.palette.blue)),
                    Span::styled(format!("{desc} "), self.palette.muted()),
                ]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Right).style(self.palette.panel()),
            columns[1],
        );
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        let mut hints = vec![("Enter", " send"), ("^N", " new"), ("^T", " theme")];
        if self.mode == ViewMode::Conversation {
            hints.push(("Tab", " tab"));
        }
        if self.streaming {
            hints.push(("Esc", " stop"));
        }
        hints.push(("^Q", " quit"));
        hints
    }
}
