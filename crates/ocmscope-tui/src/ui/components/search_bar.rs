use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::ui::Theme;

/// One-line search input with a result counter on the right
pub struct SearchBar<'a> {
    title: &'a str,
    input: &'a str,
    active: bool,
    counter: Option<String>,
}

impl<'a> SearchBar<'a> {
    pub fn new(title: &'a str, input: &'a str) -> Self {
        Self {
            title,
            input,
            active: false,
            counter: None,
        }
    }

    /// Whether keystrokes currently go to this bar
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn counter<S: Into<String>>(mut self, counter: S) -> Self {
        self.counter = Some(counter.into());
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let prompt = " / ";
        let mut spans = vec![
            Span::styled(prompt, Theme::text_highlight()),
            Span::styled(self.input.to_string(), Theme::text()),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.active {
                Theme::border_focused()
            } else {
                Theme::border()
            })
            .title(Span::styled(format!(" {} ", self.title), Theme::title()));
        let inner = block.inner(area);

        if let Some(counter) = &self.counter {
            let used = prompt.width() + self.input.width();
            let pad = (inner.width as usize).saturating_sub(used + counter.width() + 1);
            spans.push(Span::raw(" ".repeat(pad)));
            spans.push(Span::styled(counter.clone(), Theme::text_dim()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);

        if self.active {
            let x = inner.x + (prompt.width() + self.input.width()) as u16;
            frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }
}
