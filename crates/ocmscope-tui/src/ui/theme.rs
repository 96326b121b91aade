use ratatui::style::{Color, Modifier, Style};

/// Styles shared by both screens
pub struct Theme;

impl Theme {
    pub const FG: Color = Color::Gray;
    pub const MUTED: Color = Color::DarkGray;
    pub const ACCENT: Color = Color::LightBlue;
    pub const MARK: Color = Color::Yellow;
    pub const BAR: Color = Color::Rgb(40, 44, 52);
    pub const OK: Color = Color::Green;
    pub const FAIL: Color = Color::Red;

    pub fn border() -> Style {
        Style::new().fg(Self::MUTED)
    }

    /// Border of the input that owns the keyboard
    pub fn border_focused() -> Style {
        Style::new().fg(Self::ACCENT)
    }

    pub fn title() -> Style {
        Style::new().fg(Self::ACCENT).add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::new().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::new().fg(Self::MUTED)
    }

    pub fn text_highlight() -> Style {
        Style::new().fg(Color::White).add_modifier(Modifier::BOLD)
    }

    pub fn table_header() -> Style {
        Self::title().add_modifier(Modifier::UNDERLINED)
    }

    pub fn row_selected() -> Style {
        Style::new().bg(Self::BAR).add_modifier(Modifier::BOLD)
    }

    pub fn search_match() -> Style {
        Style::new().fg(Color::Black).bg(Self::MARK)
    }

    /// The match n/N currently points at
    pub fn search_match_current() -> Style {
        Style::new()
            .fg(Color::Black)
            .bg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar() -> Style {
        Style::new().fg(Self::FG).bg(Self::BAR)
    }

    pub fn status_bar_key() -> Style {
        Self::status_bar().fg(Self::ACCENT).add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::new().fg(Self::FAIL).add_modifier(Modifier::BOLD)
    }

    pub fn info() -> Style {
        Style::new().fg(Self::OK)
    }
}
