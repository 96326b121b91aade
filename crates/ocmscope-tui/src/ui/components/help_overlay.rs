use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::Screen;
use crate::ui::Layout;

/// Help overlay showing the keybindings of the current screen
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, screen: Screen) {
        let mut help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        help_text.extend(match screen {
            Screen::DetailsTable => Self::table_lines(),
            Screen::LogViewer => Self::log_viewer_lines(),
        });
        help_text.push(Line::from(""));
        help_text.push(Self::section("General"));
        help_text.push(Self::key_line("?", "Toggle this help"));
        help_text.push(Self::key_line("Esc", "Go back"));
        help_text.push(Self::key_line("q", "Quit"));

        let popup_area = Layout::centered(frame.area(), 50, help_text.len() as u16 + 2);
        frame.render_widget(Clear, popup_area);

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn table_lines() -> Vec<Line<'static>> {
        vec![
            Self::section("Rows"),
            Self::key_line("j/↓", "Next row"),
            Self::key_line("k/↑", "Previous row"),
            Self::key_line("Enter", "Open pod logs"),
            Line::from(""),
            Self::section("Pages"),
            Self::key_line("l/→", "Next page"),
            Self::key_line("h/←", "Previous page"),
            Self::key_line("p", "Cycle page size"),
            Line::from(""),
            Self::section("Filter & sort"),
            Self::key_line("/", "Filter rows"),
            Self::key_line("1 2 3", "Sort by name, namespace, cluster"),
            Self::key_line("0", "Sort by status"),
        ]
    }

    fn log_viewer_lines() -> Vec<Line<'static>> {
        vec![
            Self::section("Navigation"),
            Self::key_line("j/↓", "Scroll down"),
            Self::key_line("k/↑", "Scroll up"),
            Self::key_line("Ctrl+d", "Page down"),
            Self::key_line("Ctrl+u", "Page up"),
            Self::key_line("g/G", "Top / bottom"),
            Line::from(""),
            Self::section("Search"),
            Self::key_line("/", "Search logs"),
            Self::key_line("n/N", "Next / previous match"),
            Line::from(""),
            Self::section("Log"),
            Self::key_line("Tab", "Next container"),
            Self::key_line("p", "Toggle previous instance"),
            Self::key_line("w", "Toggle line wrap"),
            Self::key_line("r", "Reload"),
            Self::key_line("e", "Export to file"),
        ]
    }

    fn section(title: &str) -> Line<'static> {
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Yellow),
        ))
    }

    fn key_line(key: &str, desc: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
