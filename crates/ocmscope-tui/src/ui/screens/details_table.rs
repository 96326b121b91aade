use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use ocmscope_table::{Column, DetailsTable, KeyValueStore, ResourceRow, SortBy};

use crate::{
    app::AppState,
    ui::{
        Layout, Theme,
        components::{SearchBar, StatusBar, table_hints},
    },
};

/// Resource details table screen
pub struct DetailsTableScreen;

impl DetailsTableScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let show_search = state.ui_state.search_active
            || state.table.as_ref().is_some_and(|t| !t.search().is_empty());
        let areas = Layout::main(frame.area(), show_search);

        Self::render_header(frame, areas.header, state);

        if let (Some(area), Some(table)) = (areas.search, &state.table) {
            SearchBar::new("Filter", table.search())
                .active(state.ui_state.search_active)
                .counter(table.results_count())
                .render(frame, area);
        }

        Self::render_table(frame, areas.content, state);
        Self::render_pager(frame, areas.footer, state);
        Self::render_status_bar(frame, areas.status, state);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![Span::styled("ocmscope", Theme::title())];
        if let Some(table) = &state.table {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(table.detail_type().to_string(), Theme::text()));
        }
        if !state.title.is_empty() {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(state.title.clone(), Theme::text_highlight()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let Some(table) = &state.table else {
            return;
        };

        let header = Row::new(
            Column::ALL
                .iter()
                .map(|column| Cell::from(Self::column_title(*column, table.sort_by()))),
        )
        .style(Theme::table_header());

        let rows: Vec<Row> = table.visible_rows().iter().map(Self::row).collect();
        let widths = Column::ALL.map(|c| Constraint::Percentage(c.width_percent()));

        let title = format!(" Resources ({}) ", table.results_count());
        let widget = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(Theme::row_selected())
            .highlight_symbol("▶ ")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(Span::styled(title, Theme::title())),
            );

        frame.render_stateful_widget(widget, area, &mut state.ui_state.table_state);
    }

    fn column_title(column: Column, sort: Option<SortBy>) -> String {
        match sort {
            Some(sort) if sort.column == column => {
                format!("{} {}", column.title(), sort.direction.arrow())
            }
            _ => column.title().to_string(),
        }
    }

    fn row(row: &ResourceRow) -> Row<'static> {
        let pulse = row.pulse;
        let name = Line::from(vec![
            Span::styled(format!("{} ", pulse.glyph()), Style::default().fg(pulse.color())),
            Span::styled(row.name.clone(), Theme::text()),
        ]);

        Row::new(vec![
            Cell::from(name),
            Cell::from(row.namespace_or_empty().to_string()),
            Cell::from(row.cluster.clone()),
        ])
    }

    fn render_pager(frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(table) = &state.table else {
            return;
        };

        frame.render_widget(Paragraph::new(Self::pager_line(table)), area);
    }

    fn pager_line<S: KeyValueStore>(table: &DetailsTable<S>) -> Line<'static> {
        Line::from(vec![
            Span::styled(" Page ", Theme::text_dim()),
            Span::styled(
                format!("{} of {}", table.page(), table.page_count()),
                Theme::text(),
            ),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(table.range_label(), Theme::text()),
            Span::styled(" │ Per page: ", Theme::text_dim()),
            Span::styled(table.per_page().to_string(), Theme::text_highlight()),
        ])
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut status = StatusBar::new().hints(table_hints());

        if let Some(err) = &state.ui_state.error_message {
            status = status.message(err.clone(), Theme::error());
        } else if let Some(info) = &state.ui_state.info_message {
            status = status.message(info.clone(), Theme::info());
        }
        if let Some(table) = &state.table {
            status = status.right(format!("{} rows", table.filtered_count()));
        }

        frame.render_widget(status, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocmscope_table::{MemoryStore, SortDirection, TopologyNode};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_sorted_column_shows_arrow() {
        let sort = Some(SortBy {
            column: Column::Cluster,
            direction: SortDirection::Desc,
        });
        assert_eq!(
            DetailsTableScreen::column_title(Column::Cluster, sort),
            format!("Cluster {}", SortDirection::Desc.arrow())
        );
        assert_eq!(DetailsTableScreen::column_title(Column::Name, sort), "Name");
    }

    #[test]
    fn test_pager_line() {
        let node = TopologyNode::from_json(
            r#"{"name":"web","type":"pod","specs":{"clustersNames":["a","b","c"],"replicaCount":4}}"#,
        )
        .unwrap();
        let mut table = DetailsTable::new("pods", &node, MemoryStore::new(), 10);
        table.next_page();

        assert_eq!(
            line_text(&DetailsTableScreen::pager_line(&table)),
            " Page 2 of 2 │ 11 - 12 of 12 │ Per page: 10"
        );
    }
}
