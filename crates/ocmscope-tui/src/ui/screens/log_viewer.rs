use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};

use ocmscope_logs::{LogSearch, strip_ansi};

use crate::app::{AppState, LogViewState};
use crate::ui::{
    Layout, Theme,
    components::{SearchBar, StatusBar, log_viewer_hints},
};

/// Log viewer screen
pub struct LogViewerScreen;

impl LogViewerScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let search_active = state.ui_state.search_active;
        let Some(logs) = state.logs.as_mut() else {
            return;
        };

        let show_search = search_active || !logs.search.input().is_empty();
        let areas = Layout::main(frame.area(), show_search);

        Self::render_header(frame, areas.header, logs);

        if let Some(area) = areas.search {
            SearchBar::new("Search", logs.search.input())
                .active(search_active)
                .counter(logs.search.count_label())
                .render(frame, area);
        }

        Self::render_logs(frame, areas.content, logs);
        Self::render_position(frame, areas.footer, logs);

        let mut status = StatusBar::new().hints(log_viewer_hints());
        if let Some(err) = &state.ui_state.error_message {
            status = status.message(err.clone(), Theme::error());
        } else if let Some(info) = &state.ui_state.info_message {
            status = status.message(info.clone(), Theme::info());
        }
        frame.render_widget(status, areas.status);
    }

    fn render_header(frame: &mut Frame, area: Rect, logs: &LogViewState) {
        let request = &logs.request;
        let mut spans = vec![
            Span::styled("ocmscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
        ];
        if let Some(context) = &request.context {
            spans.push(Span::styled(context.clone(), Theme::text()));
            spans.push(Span::styled(" │ ", Theme::text_dim()));
        }
        spans.push(Span::styled(request.namespace.clone(), Theme::text()));
        spans.push(Span::styled(" │ ", Theme::text_dim()));
        spans.push(Span::styled(request.pod.clone(), Theme::text_highlight()));

        if let Some(container) = &request.container {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(container.clone(), Theme::text()));
            if logs.containers.len() > 1 {
                spans.push(Span::styled(
                    format!(" ({}/{})", logs.container_index + 1, logs.containers.len()),
                    Theme::text_dim(),
                ));
            }
        }
        if request.previous {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled("previous", Theme::error()));
        }
        if logs.wrap_lines {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled("wrap", Theme::text_dim()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_logs(frame: &mut Frame, area: Rect, logs: &mut LogViewState) {
        let inner_height = area.height.saturating_sub(2) as usize;
        logs.viewport_height = inner_height.max(1);
        logs.clamp_scroll();

        let total = logs.buffer.len();
        let title = if logs.loading {
            " Loading… ".to_string()
        } else {
            format!(" Logs ({} lines) ", total)
        };

        let lines: Vec<Line> = logs
            .buffer
            .range(logs.scroll, inner_height)
            .iter()
            .enumerate()
            .map(|(i, raw)| highlight_line(raw, logs.scroll + i, &logs.search))
            .collect();

        let mut widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );
        if logs.wrap_lines {
            widget = widget.wrap(Wrap { trim: false });
        }

        frame.render_widget(widget, area);

        let max_scroll = logs.max_scroll();
        if max_scroll > 0 {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(logs.scroll);

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_position(frame: &mut Frame, area: Rect, logs: &LogViewState) {
        let total = logs.buffer.len();
        let text = if total == 0 {
            " No lines".to_string()
        } else {
            let first = logs.scroll + 1;
            let last = (logs.scroll + logs.viewport_height).min(total);
            format!(" Lines {}-{} of {}", first, last, total)
        };
        frame.render_widget(Paragraph::new(Span::styled(text, Theme::text_dim())), area);
    }
}

/// Render one log line with search matches highlighted
///
/// Escape sequences are removed first so match positions line up with the
/// text the search indexed. The focused match gets its own style.
pub fn highlight_line(raw: &str, row: usize, search: &LogSearch) -> Line<'static> {
    let clean = strip_ansi(raw);
    let Some(matcher) = search.matcher() else {
        return Line::from(clean.into_owned());
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for (i, (start, end)) in matcher.find_ranges(&clean).into_iter().enumerate() {
        if start > last {
            spans.push(Span::raw(clean[last..start].to_string()));
        }
        let style: Style = if search.is_current(row, i + 1) {
            Theme::search_match_current()
        } else {
            Theme::search_match()
        };
        spans.push(Span::styled(clean[start..end].to_string(), style));
        last = end;
    }
    if last < clean.len() {
        spans.push(Span::raw(clean[last..].to_string()));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_over(lines: &[&str], term: &str) -> LogSearch {
        let mut search = LogSearch::new(1);
        search.update(term, lines, lines.len());
        search
    }

    #[test]
    fn test_plain_line_without_search() {
        let line = highlight_line("\x1b[32mok\x1b[0m", 0, &LogSearch::default());
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "ok");
    }

    #[test]
    fn test_matches_are_split_out() {
        let lines = ["Error: error"];
        let search = search_over(&lines, "error");
        let line = highlight_line(lines[0], 0, &search);

        let parts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["Error", ": ", "error"]);
        // First occurrence is focused after a fresh search
        assert_eq!(line.spans[0].style, Theme::search_match_current());
        assert_eq!(line.spans[2].style, Theme::search_match());
    }

    #[test]
    fn test_focus_follows_navigation() {
        let lines = ["no", "x error", "error x"];
        let mut search = search_over(&lines, "error");
        search.next();

        let second = highlight_line(lines[1], 1, &search);
        assert_eq!(second.spans[1].style, Theme::search_match());
        let third = highlight_line(lines[2], 2, &search);
        assert_eq!(third.spans[0].style, Theme::search_match_current());
    }
}
