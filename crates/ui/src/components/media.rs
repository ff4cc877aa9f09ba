use crate::media::{MediaKind, MediaPanel, MediaPanels};
use crate::theme::ThemePalette;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

/// One bordered box per media panel
pub struct MediaView<'a> {
    panels: &'a MediaPanels,
    palette: ThemePalette,
}

impl<'a> MediaView<'a> {
    pub fn new(panels: &'a MediaPanels, palette: ThemePalette) -> Self {
        Self { panels, palette }
    }

    pub fn render(&self, frame: &mut Frame<'_>, kind: MediaKind, area: Rect) {
        if area.width < 4 || area.height < 2 {
            return;
        }

        let panel = self.panels.panel(kind);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.palette.border())
            .title(Span::styled(format!(" {} ", kind.title()), self.palette.accent()))
            .title_bottom(self.download_hint(panel))
            .style(self.palette.panel());

        let body = Paragraph::new(self.body(panel))
            .wrap(Wrap { trim: false })
            .style(self.palette.panel())
            .block(block);
        frame.render_widget(body, area);
    }

    fn body(&self, panel: &MediaPanel) -> Vec<Line<'static>> {
        let Some(name) = panel.file_name() else {
            return vec![Line::from(Span::styled(
                format!("No {} yet", panel.kind.title().to_lowercase()),
                self.palette.muted(),
            ))];
        };

        let mut lines = vec![Line::from(Span::styled(name, Style::default().fg(self.palette.fg)))];
        if !panel.is_available() {
            lines.push(Line::from(Span::styled("file not found", self.palette.error())));
            return lines;
        }
        if panel.kind == MediaKind::Transcript
            && let Some(preview) = self.panels.transcript_preview()
        {
            lines.extend(preview.lines().map(|l| Line::from(Span::styled(l.to_string(), self.palette.muted()))));
        }
        lines
    }

    fn download_hint(&self, panel: &MediaPanel) -> Line<'static> {
        let key_style = if panel.is_available() { Style::default().fg(self.palette.blue) } else { self.palette.muted() };
        Line::from(vec![
            Span::styled(format!(" [{}]", panel.kind.download_key()), key_style),
            Span::styled(" Download ", self.palette.muted()),
        ])
    }
}
