use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::app::{Modal, ModalKind};

/// Dialog rectangle for a message inside `area`: fixed width band, height
/// from a wrap estimate over the message's display width.
fn dialog_size(message: &str, area: Rect) -> (u16, u16) {
    let width = 60.min(area.width.saturating_sub(4)).max(20);
    // Rough wrap estimate plus borders, hint line and padding.
    let text_lines = (message.width() as u16 / width.saturating_sub(4).max(1)) + 1;
    let height = (text_lines + 6).min(area.height.saturating_sub(2));
    (width, height)
}

/// Centered blocking dialog. Input handling elsewhere stops while one is on
/// screen, which is what makes it the message-box equivalent.
pub fn render_modal(frame: &mut Frame, modal: &Modal, theme: &Theme) {
    let area = frame.area();

    let (width, height) = dialog_size(&modal.message, area);
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let dialog_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, dialog_area);

    let border_style = match modal.kind {
        ModalKind::Info => theme.accent_style(),
        ModalKind::Warning => theme.warning_style(),
        ModalKind::Error => theme.error_style(),
    };

    let block = Block::default()
        .title(format!(" {} ", modal.title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let mut lines = vec![Line::from("")];
    lines.push(Line::from(Span::styled(
        modal.message.clone(),
        theme.text_style(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter / Esc to dismiss",
        theme.muted_style(),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_height_counts_display_width_not_bytes() {
        let area = Rect::new(0, 0, 80, 40);
        let plain = "Preco invalido para o produto pedido. ".repeat(4);
        let accented = "Preço inválido para o produto pedido. ".repeat(4);

        assert_eq!(dialog_size(&plain, area), dialog_size(&accented, area));
    }

    #[test]
    fn dialog_fits_inside_a_small_terminal() {
        let area = Rect::new(0, 0, 30, 10);
        let (width, height) = dialog_size(&"x".repeat(500), area);

        assert!(width <= area.width.saturating_sub(4));
        assert!(height <= area.height.saturating_sub(2));
    }
}
