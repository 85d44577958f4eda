use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use tui_textarea::TextArea;

use super::theme::Theme;
use crate::app::FormField;

/// The four back-office actions, plus `None` for "nothing under the cursor".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    None,
    ActiveBooks,
    UpdateQuantity,
    PriceWithVat,
    ExportCsv,
}

impl ActionButton {
    pub fn label(self) -> &'static str {
        match self {
            ActionButton::None => "",
            ActionButton::ActiveBooks => " Active books ",
            ActionButton::UpdateQuantity => " Update quantity ",
            ActionButton::PriceWithVat => " Price with VAT ",
            ActionButton::ExportCsv => " Export CSV ",
        }
    }
}

pub struct ButtonRegion {
    pub active_books: Rect,
    pub update_quantity: Rect,
    pub price_with_vat: Rect,
    pub export_csv: Rect,
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

impl ButtonRegion {
    pub fn hit_test(&self, x: u16, y: u16) -> ActionButton {
        if contains(self.active_books, x, y) {
            ActionButton::ActiveBooks
        } else if contains(self.update_quantity, x, y) {
            ActionButton::UpdateQuantity
        } else if contains(self.price_with_vat, x, y) {
            ActionButton::PriceWithVat
        } else if contains(self.export_csv, x, y) {
            ActionButton::ExportCsv
        } else {
            ActionButton::None
        }
    }
}

/// Renders the form panel: the stock-update input pair, the VAT input pair
/// and the action buttons. Returns the button rects for mouse hit-testing.
#[allow(clippy::too_many_arguments)]
pub fn render_form(
    frame: &mut Frame,
    area: Rect,
    product_id: &TextArea,
    quantity: &TextArea,
    price: &TextArea,
    vat_rate: &TextArea,
    focused_field: Option<FormField>,
    selected_button: ActionButton,
    hovered_button: ActionButton,
    theme: &Theme,
) -> ButtonRegion {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let stock_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let vat_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_input(
        frame,
        stock_row[0],
        product_id,
        " Product id ",
        focused_field == Some(FormField::ProductId),
        theme,
    );
    render_input(
        frame,
        stock_row[1],
        quantity,
        " New quantity ",
        focused_field == Some(FormField::Quantity),
        theme,
    );
    render_input(
        frame,
        vat_row[0],
        price,
        " Price ",
        focused_field == Some(FormField::Price),
        theme,
    );
    render_input(
        frame,
        vat_row[1],
        vat_rate,
        " VAT rate (e.g. 0.23) ",
        focused_field == Some(FormField::VatRate),
        theme,
    );

    let buttons = [
        ActionButton::ActiveBooks,
        ActionButton::UpdateQuantity,
        ActionButton::PriceWithVat,
        ActionButton::ExportCsv,
    ];

    let spacing = 2u16;
    let mut x = rows[2].x + 1;
    let mut rects = [Rect::default(); 4];
    for (i, button) in buttons.iter().enumerate() {
        let width = button.label().len() as u16;
        rects[i] = Rect::new(x, rows[2].y, width, 1).intersection(rows[2]);
        x += width + spacing;

        if rects[i].width > 0 {
            let style = button_style(*button, selected_button, hovered_button, theme);
            frame.render_widget(Paragraph::new(button.label()).style(style), rects[i]);
        }
    }

    ButtonRegion {
        active_books: rects[0],
        update_quantity: rects[1],
        price_with_vat: rects[2],
        export_csv: rects[3],
    }
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    textarea: &TextArea,
    title: &str,
    focused: bool,
    theme: &Theme,
) {
    let mut ta = textarea.clone();
    ta.set_block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme.block_style(focused))
            .style(Style::default().bg(theme.bg_secondary)),
    );
    ta.set_style(theme.text_style());
    if focused {
        ta.set_cursor_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .bg(theme.accent),
        );
    } else {
        ta.set_cursor_style(Style::default());
    }
    frame.render_widget(&ta, area);
}

fn button_style(
    button: ActionButton,
    selected: ActionButton,
    hovered: ActionButton,
    theme: &Theme,
) -> Style {
    if button == selected {
        theme.button_active_style()
    } else if button == hovered {
        theme.button_hover_style()
    } else {
        theme.button_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_maps_coordinates_to_buttons() {
        let region = ButtonRegion {
            active_books: Rect::new(1, 0, 14, 1),
            update_quantity: Rect::new(17, 0, 17, 1),
            price_with_vat: Rect::new(36, 0, 16, 1),
            export_csv: Rect::new(54, 0, 12, 1),
        };

        assert_eq!(region.hit_test(1, 0), ActionButton::ActiveBooks);
        assert_eq!(region.hit_test(20, 0), ActionButton::UpdateQuantity);
        assert_eq!(region.hit_test(40, 0), ActionButton::PriceWithVat);
        assert_eq!(region.hit_test(60, 0), ActionButton::ExportCsv);
        assert_eq!(region.hit_test(60, 5), ActionButton::None);
        assert_eq!(region.hit_test(0, 0), ActionButton::None);
    }
}
