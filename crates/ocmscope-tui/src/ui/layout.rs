use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Header, optional search bar, content, one-line footer, status bar
    pub fn main(area: Rect, show_search: bool) -> ScreenAreas {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                               // Header
                Constraint::Length(if show_search { 3 } else { 0 }), // Search bar
                Constraint::Min(1),                                  // Content
                Constraint::Length(1),                               // Footer
                Constraint::Length(1),                               // Status bar
            ])
            .split(area);

        ScreenAreas {
            header: chunks[0],
            search: show_search.then_some(chunks[1]),
            content: chunks[2],
            footer: chunks[3],
            status: chunks[4],
        }
    }

    /// Rectangle of at most `width` x `height`, centered in `area`
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

/// Regions of a screen, see [`Layout::main`]
#[derive(Clone, Copy, Debug)]
pub struct ScreenAreas {
    pub header: Rect,
    pub search: Option<Rect>,
    pub content: Rect,
    pub footer: Rect,
    pub status: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_bar_takes_space_only_when_shown() {
        let area = Rect::new(0, 0, 80, 24);

        let without = Layout::main(area, false);
        assert!(without.search.is_none());
        assert_eq!(without.content.height, 24 - 3 - 1 - 1);

        let with = Layout::main(area, true);
        assert_eq!(with.search.map(|r| r.height), Some(3));
        assert_eq!(with.content.height, 24 - 3 - 3 - 1 - 1);
    }

    #[test]
    fn test_centered_fits_inside() {
        let area = Rect::new(0, 0, 40, 20);
        let popup = Layout::centered(area, 100, 100);
        assert_eq!(popup, Rect::new(2, 2, 36, 16));
    }
}
