use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::db::QueryResult;

const MIN_COL_WIDTH: u16 = 6;
const MAX_COL_WIDTH: u16 = 40;

pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    result: &QueryResult,
    state: &mut TableState,
    focused: bool,
    theme: &Theme,
) {
    if result.is_empty() {
        let block = Block::default()
            .title(" Results ")
            .borders(Borders::ALL)
            .border_style(theme.block_style(focused));
        frame.render_widget(block, area);
        return;
    }

    let header_cells = result
        .columns
        .iter()
        .map(|h| Cell::from(h.clone()).style(theme.header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = result
        .rows
        .iter()
        .map(|row| {
            let cells = row.iter().map(|c| {
                Cell::from(c.as_deref().unwrap_or("NULL").to_string()).style(theme.text_style())
            });
            Row::new(cells).height(1)
        })
        .collect();

    let widths: Vec<Constraint> = column_widths(result)
        .into_iter()
        .map(Constraint::Length)
        .collect();

    let title = format!(" Results ({} rows) ", result.rows.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(theme.block_style(focused)),
        )
        .row_highlight_style(theme.selected_style());

    frame.render_stateful_widget(table, area, state);
}

/// Per-column display width: the widest cell in the column, clamped so a
/// single long value cannot push everything else off screen.
fn column_widths(result: &QueryResult) -> Vec<u16> {
    result
        .columns
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let mut width = header.width();
            for row in &result.rows {
                if let Some(cell) = row.get(idx) {
                    width = width.max(cell.as_deref().unwrap_or("NULL").width());
                }
            }
            (width as u16).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_width_follows_widest_cell_within_bounds() {
        let result = QueryResult {
            columns: vec!["id".to_string(), "title".to_string()],
            rows: vec![
                vec![Some("1".to_string()), Some("A Relíquia".to_string())],
                vec![None, Some("x".repeat(200))],
            ],
        };

        let widths = column_widths(&result);
        assert_eq!(widths[0], MIN_COL_WIDTH);
        assert_eq!(widths[1], MAX_COL_WIDTH);
    }
}
