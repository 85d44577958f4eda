use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme::Theme;

/// Read-only result line under the table, the counterpart of the original
/// form's output area.
pub fn render_output(frame: &mut Frame, area: Rect, output: &str, theme: &Theme) {
    let text = if output.is_empty() {
        Paragraph::new("Run an action to see its result here.").style(theme.muted_style())
    } else {
        Paragraph::new(output).style(theme.text_style())
    };

    frame.render_widget(
        text.wrap(Wrap { trim: true }).block(
            Block::default()
                .title(" Result ")
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        ),
        area,
    );
}
