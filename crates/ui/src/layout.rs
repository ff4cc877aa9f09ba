use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Terminal width at which the media column moves beside the chat
pub const WIDE_BREAKPOINT: u16 = 100;

/// Layout breakpoints for the conversation screen
///
/// - >= 100 cols: chat and media side by side
/// - < 100 cols: media panels stacked below the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Wide,
    Stacked,
}

impl From<u16> for LayoutMode {
    fn from(width: u16) -> Self {
        if width >= WIDE_BREAKPOINT { Self::Wide } else { Self::Stacked }
    }
}

/// Shrink `area` by the given margins
pub fn inset_area(area: Rect, left: u16, right: u16, top: u16, bottom: u16) -> Rect {
    Rect {
        x: area.x.saturating_add(left),
        y: area.y.saturating_add(top),
        width: area.width.saturating_sub(left + right),
        height: area.height.saturating_sub(top + bottom),
    }
}

/// Initial screen: header, centered heading and prompt box, footer
#[derive(Debug, Clone)]
pub struct InitialLayout {
    pub header: Rect,
    pub heading: Rect,
    pub input: Rect,
    pub footer: Rect,
}

impl InitialLayout {
    pub fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let body = rows[1];

        let width = 64.min(body.width.saturating_sub(4));
        let x = body.x + body.width.saturating_sub(width) / 2;
        let block_height = 5;
        let y = body.y + body.height.saturating_sub(block_height) / 2;

        let heading = Rect { x, y, width, height: 1.min(body.height) };
        let input = Rect {
            x,
            y: (y + 2).min(body.y + body.height),
            width,
            height: 3.min(body.height.saturating_sub(2)),
        };

        Self { header: rows[0], heading, input, footer: rows[2] }
    }
}

/// Conversation screen: header, chat column, media column, footer
#[derive(Debug, Clone)]
pub struct ConversationLayout {
    pub mode: LayoutMode,
    pub header: Rect,
    /// Chat tab bar (1 line)
    pub tabs: Rect,
    pub transcript: Rect,
    /// Input box (3 lines)
    pub input: Rect,
    pub video: Rect,
    pub media_transcript: Rect,
    pub audio: Rect,
    pub footer: Rect,
}

impl ConversationLayout {
    pub fn calculate(area: Rect) -> Self {
        let mode = LayoutMode::from(area.width);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let main = rows[1];

        let (chat, media) = match mode {
            LayoutMode::Wide => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(main);
                (columns[0], columns[1])
            }
            LayoutMode::Stacked => {
                let stacked = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(7)])
                    .split(main);
                (stacked[0], stacked[1])
            }
        };

        let chat_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(3)])
            .split(chat);

        let media_direction = match mode {
            LayoutMode::Wide => Direction::Vertical,
            LayoutMode::Stacked => Direction::Horizontal,
        };
        let panels = Layout::default()
            .direction(media_direction)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(media);

        Self {
            mode,
            header: rows[0],
            tabs: chat_rows[0],
            transcript: chat_rows[1],
            input: chat_rows[2],
            video: panels[0],
            media_transcript: panels[1],
            audio: panels[2],
            footer: rows[2],
        }
    }
}
