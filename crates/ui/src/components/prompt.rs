use crate::theme::ThemePalette;

use ratatui::{Frame, layout::Alignment, layout::Rect, style::Modifier, text::Line, widgets::Paragraph};

pub const HEADING: &str = "What do you want to learn today ?";

/// Centered heading on the initial screen
pub struct Heading {
    palette: ThemePalette,
}

impl Heading {
    pub fn new(palette: ThemePalette) -> Self {
        Self { palette }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let heading = Paragraph::new(Line::from(HEADING))
            .alignment(Alignment::Center)
            .style(self.palette.base().add_modifier(Modifier::BOLD));
        frame.render_widget(heading, area);
    }
}
