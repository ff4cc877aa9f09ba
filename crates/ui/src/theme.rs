use mathcast_core::ThemeMode;
use ratatui::style::{Color, Modifier, Style};

/// Colors for one theme variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    /// Primary background (fills terminal)
    pub bg: Color,
    /// Primary text
    pub fg: Color,
    /// Panels, cards, input
    pub panel_bg: Color,
    /// Selected tab, focused elements
    pub active: Color,
    /// Secondary text, hints
    pub muted: Color,
    pub border: Color,
    /// Primary accent
    pub blue: Color,
    pub cyan: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    /// User message bubble
    pub user_bubble_bg: Color,
    pub user_bubble_fg: Color,
    /// Assistant message bubble
    pub assistant_bubble_bg: Color,
}

impl ThemePalette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn panel(&self) -> Style {
        Style::default().fg(self.fg).bg(self.panel_bg)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.blue).add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.red)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.green)
    }

    pub fn user_bubble(&self) -> Style {
        Style::default().fg(self.user_bubble_fg).bg(self.user_bubble_bg)
    }

    pub fn assistant_bubble(&self) -> Style {
        Style::default().fg(self.fg).bg(self.assistant_bubble_bg)
    }
}

/// Theme palettes for the terminal host
///
/// Dark is based on iceberg.vim (https://github.com/cocopon/iceberg.vim);
/// light is its paper-toned counterpart.
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    pub const DARK: ThemePalette = ThemePalette {
        bg: Color::Rgb(22, 24, 33),
        fg: Color::Rgb(198, 200, 209),
        panel_bg: Color::Rgb(30, 33, 50),
        active: Color::Rgb(39, 44, 66),
        muted: Color::Rgb(107, 112, 137),
        border: Color::Rgb(60, 65, 90),
        blue: Color::Rgb(132, 160, 198),
        cyan: Color::Rgb(137, 184, 194),
        green: Color::Rgb(180, 190, 130),
        yellow: Color::Rgb(226, 164, 120),
        red: Color::Rgb(226, 120, 120),
        user_bubble_bg: Color::Rgb(132, 160, 198),
        user_bubble_fg: Color::Rgb(22, 24, 33),
        assistant_bubble_bg: Color::Rgb(30, 33, 50),
    };

    pub const LIGHT: ThemePalette = ThemePalette {
        bg: Color::Rgb(232, 233, 236),
        fg: Color::Rgb(51, 55, 76),
        panel_bg: Color::Rgb(220, 223, 231),
        active: Color::Rgb(201, 205, 215),
        muted: Color::Rgb(131, 136, 159),
        border: Color::Rgb(167, 171, 190),
        blue: Color::Rgb(45, 83, 154),
        cyan: Color::Rgb(63, 131, 166),
        green: Color::Rgb(102, 138, 61),
        yellow: Color::Rgb(193, 131, 73),
        red: Color::Rgb(204, 81, 122),
        user_bubble_bg: Color::Rgb(45, 83, 154),
        user_bubble_fg: Color::Rgb(232, 233, 236),
        assistant_bubble_bg: Color::Rgb(220, 223, 231),
    };

    /// Palette for the given theme mode
    pub fn palette(mode: ThemeMode) -> ThemePalette {
        match mode {
            ThemeMode::Light => Self::LIGHT,
            ThemeMode::Dark => Self::DARK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_per_mode() {
        assert_eq!(Theme::palette(ThemeMode::Dark), Theme::DARK);
        assert_eq!(Theme::palette(ThemeMode::Light), Theme::LIGHT);
        assert_ne!(Theme::DARK.bg, Theme::LIGHT.bg);
    }

    #[test]
    fn test_toggled_palette_round_trip() {
        let mode = ThemeMode::Light;
        assert_eq!(Theme::palette(mode.toggled().toggled()), Theme::palette(mode));
        assert_ne!(Theme::palette(mode.toggled()), Theme::palette(mode));
    }

    #[test]
    fn test_styles() {
        let palette = Theme::DARK;
        let base = palette.base();
        assert_eq!(base.fg, Some(palette.fg));
        assert_eq!(base.bg, Some(palette.bg));

        let panel = palette.panel();
        assert_eq!(panel.bg, Some(palette.panel_bg));

        let user = Theme::LIGHT.user_bubble();
        assert_eq!(user.bg, Some(Theme::LIGHT.user_bubble_bg));
    }
}
