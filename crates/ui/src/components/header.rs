use crate::theme::ThemePalette;

use mathcast_core::{ChatSession, ThemeMode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Header bar: app name and active chat on the left, provider and theme on the right
pub struct Header<'a> {
    sessions: &'a [ChatSession],
    active: Option<&'a ChatSession>,
    provider: &'a str,
    theme: ThemeMode,
    palette: ThemePalette,
}

impl<'a> Header<'a> {
    pub fn new(
        sessions: &'a [ChatSession], active: Option<&'a ChatSession>, provider: &'a str, theme: ThemeMode,
        palette: ThemePalette,
    ) -> Self {
        Self { sessions, active, provider, theme, palette }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Paragraph::new("").style(self.palette.panel()), area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(self.right_width())])
            .split(area);

        frame.render_widget(Paragraph::new(self.left_line()).style(self.palette.panel()), columns[0]);
        frame.render_widget(
            Paragraph::new(self.right_line()).alignment(Alignment::Right).style(self.palette.panel()),
            columns[1],
        );
    }

    /// 1-based position of the active chat among all sessions
    fn position(&self) -> Option<(usize, usize)> {
        let active = self.active?;
        let index = self.sessions.iter().position(|s| s.id == active.id)?;
        Some((index + 1, self.sessions.len()))
    }

    fn left_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(" mathcast", self.palette.accent()),
            Span::styled(" │ ", self.palette.border()),
        ];

        if let Some(session) = self.active {
            spans.push(Span::styled(
                session.title.clone(),
                Style::default().fg(self.palette.fg).add_modifier(Modifier::BOLD),
            ));
        }
        if let Some((index, total)) = self.position() {
            spans.push(Span::styled(format!("  [{index}/{total}]"), self.palette.muted()));
        }
        Line::from(spans)
    }

    fn right_text(&self) -> String {
        format!("{} · {} ", self.provider, self.theme)
    }

    fn right_width(&self) -> u16 {
        self.right_text().chars().count() as u16
    }

    fn right_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(self.provider.to_string(), Style::default().fg(self.palette.cyan)),
            Span::styled(" · ", self.palette.muted()),
            Span::styled(format!("{} ", self.theme), Style::default().fg(self.palette.yellow)),
        ])
    }
}
