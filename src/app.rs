use ratatui::widgets::{ListState, TableState};
use tui_textarea::TextArea;

use crate::db::{BackofficeDb, QueryResult};
use crate::storage::RecentConnection;
use crate::ui::{ActionButton, ButtonRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Connect,
    Backoffice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFocus {
    RecentList,
    NewInput,
}

/// The four text inputs of the back-office form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ProductId,
    Quantity,
    Price,
    VatRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(FormField),
    Buttons,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Info,
    Warning,
    Error,
}

/// Blocking message dialog, the terminal stand-in for a message box. While
/// one is open every other interaction waits.
#[derive(Debug, Clone)]
pub struct Modal {
    pub kind: ModalKind,
    pub title: String,
    pub message: String,
}

pub struct App<'a> {
    pub state: AppState,
    pub focus: Focus,
    pub connection_focus: ConnectionFocus,
    pub connection_input: TextArea<'a>,
    pub connection_error: Option<String>,
    pub recent_connections: Vec<RecentConnection>,
    pub recent_connections_state: ListState,
    pub db: Option<BackofficeDb>,
    pub product_id_input: TextArea<'a>,
    pub quantity_input: TextArea<'a>,
    pub price_input: TextArea<'a>,
    pub vat_rate_input: TextArea<'a>,
    pub selected_button: ActionButton,
    pub hovered_button: ActionButton,
    pub button_region: Option<ButtonRegion>,
    pub results: QueryResult,
    pub results_state: TableState,
    pub output: String,
    pub modal: Option<Modal>,
    pub should_quit: bool,
}

fn new_input<'a>() -> TextArea<'a> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(ratatui::style::Style::default());
    input
}

impl<'a> App<'a> {
    pub fn new() -> Self {
        Self {
            state: AppState::Connect,
            focus: Focus::Field(FormField::ProductId),
            connection_focus: ConnectionFocus::NewInput,
            connection_input: new_input(),
            connection_error: None,
            recent_connections: vec![],
            recent_connections_state: ListState::default(),
            db: None,
            product_id_input: new_input(),
            quantity_input: new_input(),
            price_input: new_input(),
            vat_rate_input: new_input(),
            selected_button: ActionButton::None,
            hovered_button: ActionButton::None,
            button_region: None,
            results: QueryResult::empty(),
            results_state: TableState::default(),
            output: String::new(),
            modal: None,
            should_quit: false,
        }
    }

    pub fn field_input(&mut self, field: FormField) -> &mut TextArea<'a> {
        match field {
            FormField::ProductId => &mut self.product_id_input,
            FormField::Quantity => &mut self.quantity_input,
            FormField::Price => &mut self.price_input,
            FormField::VatRate => &mut self.vat_rate_input,
        }
    }

    /// The text of one field. Enter is intercepted by the event loop, so
    /// each input only ever holds a single line.
    pub fn field_text(&self, field: FormField) -> String {
        let input = match field {
            FormField::ProductId => &self.product_id_input,
            FormField::Quantity => &self.quantity_input,
            FormField::Price => &self.price_input,
            FormField::VatRate => &self.vat_rate_input,
        };
        input.lines().join("")
    }

    /// Validates the stock-update inputs. Empty input warns, a non-integer
    /// shows an error; either way no database call happens.
    pub fn stock_update_args(&mut self) -> Option<(i32, i32)> {
        let id_text = self.field_text(FormField::ProductId);
        let qty_text = self.field_text(FormField::Quantity);

        if id_text.trim().is_empty() || qty_text.trim().is_empty() {
            self.show_warning(
                "Missing input",
                "Fill in the product id and the new quantity.",
            );
            return None;
        }

        let product_id = match parse_int_field("Product id", &id_text) {
            Ok(v) => v,
            Err(msg) => {
                self.show_error(msg);
                return None;
            }
        };
        let quantity = match parse_int_field("New quantity", &qty_text) {
            Ok(v) => v,
            Err(msg) => {
                self.show_error(msg);
                return None;
            }
        };

        Some((product_id, quantity))
    }

    /// Validates the VAT inputs. Both are required but otherwise pass through
    /// to the SQL function exactly as typed.
    pub fn vat_args(&mut self) -> Option<(String, String)> {
        let price = self.field_text(FormField::Price);
        let vat_rate = self.field_text(FormField::VatRate);

        if price.trim().is_empty() || vat_rate.trim().is_empty() {
            self.show_warning("Missing input", "Fill in the price and the VAT rate.");
            return None;
        }

        Some((price, vat_rate))
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Field(FormField::ProductId) => Focus::Field(FormField::Quantity),
            Focus::Field(FormField::Quantity) => Focus::Field(FormField::Price),
            Focus::Field(FormField::Price) => Focus::Field(FormField::VatRate),
            Focus::Field(FormField::VatRate) => Focus::Buttons,
            Focus::Buttons => Focus::Results,
            Focus::Results => Focus::Field(FormField::ProductId),
        };
        if self.focus == Focus::Buttons {
            self.selected_button = ActionButton::ActiveBooks;
        } else {
            self.selected_button = ActionButton::None;
        }
    }

    pub fn cycle_button(&mut self) {
        self.selected_button = match self.selected_button {
            ActionButton::None => ActionButton::ActiveBooks,
            ActionButton::ActiveBooks => ActionButton::UpdateQuantity,
            ActionButton::UpdateQuantity => ActionButton::PriceWithVat,
            ActionButton::PriceWithVat => ActionButton::ExportCsv,
            ActionButton::ExportCsv => ActionButton::ActiveBooks,
        };
    }

    pub fn cycle_button_reverse(&mut self) {
        self.selected_button = match self.selected_button {
            ActionButton::None => ActionButton::ExportCsv,
            ActionButton::ActiveBooks => ActionButton::ExportCsv,
            ActionButton::UpdateQuantity => ActionButton::ActiveBooks,
            ActionButton::PriceWithVat => ActionButton::UpdateQuantity,
            ActionButton::ExportCsv => ActionButton::PriceWithVat,
        };
    }

    pub fn set_results(&mut self, results: QueryResult) {
        self.results_state = TableState::default();
        self.results = results;
    }

    pub fn select_next_row(&mut self) {
        if self.results.rows.is_empty() {
            return;
        }
        let i = match self.results_state.selected() {
            Some(i) => (i + 1) % self.results.rows.len(),
            None => 0,
        };
        self.results_state.select(Some(i));
    }

    pub fn select_prev_row(&mut self) {
        if self.results.rows.is_empty() {
            return;
        }
        let i = match self.results_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.results.rows.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.results_state.select(Some(i));
    }

    pub fn show_info(&mut self, title: &str, message: impl Into<String>) {
        self.modal = Some(Modal {
            kind: ModalKind::Info,
            title: title.to_string(),
            message: message.into(),
        });
    }

    pub fn show_warning(&mut self, title: &str, message: impl Into<String>) {
        self.modal = Some(Modal {
            kind: ModalKind::Warning,
            title: title.to_string(),
            message: message.into(),
        });
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.modal = Some(Modal {
            kind: ModalKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        });
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    pub fn set_recent_connections(&mut self, connections: Vec<RecentConnection>) {
        self.recent_connections = connections;
        if !self.recent_connections.is_empty() {
            self.recent_connections_state.select(Some(0));
            self.connection_focus = ConnectionFocus::RecentList;
        } else {
            self.connection_focus = ConnectionFocus::NewInput;
        }
    }

    pub fn select_next_recent(&mut self) {
        if self.recent_connections.is_empty() {
            return;
        }
        let i = match self.recent_connections_state.selected() {
            Some(i) => (i + 1) % self.recent_connections.len(),
            None => 0,
        };
        self.recent_connections_state.select(Some(i));
    }

    pub fn select_prev_recent(&mut self) {
        if self.recent_connections.is_empty() {
            return;
        }
        let i = match self.recent_connections_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.recent_connections.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.recent_connections_state.select(Some(i));
    }

    pub fn get_selected_recent_connection(&self) -> Option<&RecentConnection> {
        self.recent_connections_state
            .selected()
            .and_then(|i| self.recent_connections.get(i))
    }

    pub fn toggle_connection_focus(&mut self) {
        self.connection_focus = match self.connection_focus {
            ConnectionFocus::RecentList => ConnectionFocus::NewInput,
            ConnectionFocus::NewInput => {
                if !self.recent_connections.is_empty() {
                    if self.recent_connections_state.selected().is_none() {
                        self.recent_connections_state.select(Some(0));
                    }
                    ConnectionFocus::RecentList
                } else {
                    ConnectionFocus::NewInput
                }
            }
        };
    }
}

/// Parses a required integer field, with the field's label in the message so
/// the dialog names what was wrong.
pub fn parse_int_field(label: &str, text: &str) -> Result<i32, String> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| format!("{label} must be a whole number, got {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_through_fields_buttons_and_results() {
        let mut app = App::new();
        assert_eq!(app.focus, Focus::Field(FormField::ProductId));

        for _ in 0..3 {
            app.cycle_focus();
        }
        assert_eq!(app.focus, Focus::Field(FormField::VatRate));

        app.cycle_focus();
        assert_eq!(app.focus, Focus::Buttons);
        assert_eq!(app.selected_button, ActionButton::ActiveBooks);

        app.cycle_focus();
        assert_eq!(app.focus, Focus::Results);
        assert_eq!(app.selected_button, ActionButton::None);

        app.cycle_focus();
        assert_eq!(app.focus, Focus::Field(FormField::ProductId));
    }

    #[test]
    fn button_cycle_wraps_in_both_directions() {
        let mut app = App::new();
        app.selected_button = ActionButton::ExportCsv;
        app.cycle_button();
        assert_eq!(app.selected_button, ActionButton::ActiveBooks);

        app.cycle_button_reverse();
        assert_eq!(app.selected_button, ActionButton::ExportCsv);
    }

    #[test]
    fn row_selection_wraps_and_tolerates_empty_results() {
        let mut app = App::new();
        app.select_next_row();
        assert_eq!(app.results_state.selected(), None);

        app.set_results(QueryResult {
            columns: vec!["Title".to_string()],
            rows: vec![
                vec![Some("a".to_string())],
                vec![Some("b".to_string())],
            ],
        });
        app.select_next_row();
        app.select_next_row();
        app.select_next_row();
        assert_eq!(app.results_state.selected(), Some(0));

        app.select_prev_row();
        assert_eq!(app.results_state.selected(), Some(1));
    }

    #[test]
    fn parse_int_field_accepts_padded_integers() {
        assert_eq!(parse_int_field("Product id", " 42 "), Ok(42));
    }

    #[test]
    fn parse_int_field_names_the_field_on_failure() {
        let err = parse_int_field("New quantity", "abc").unwrap_err();
        assert!(err.contains("New quantity"));
        assert!(err.contains("abc"));
    }

    #[test]
    fn empty_stock_inputs_warn_before_any_database_call() {
        let mut app = App::new();
        assert_eq!(app.stock_update_args(), None);
        assert_eq!(app.modal.as_ref().unwrap().kind, ModalKind::Warning);
        assert!(app.db.is_none());
        assert!(app.output.is_empty());
    }

    #[test]
    fn non_numeric_product_id_shows_an_error_not_a_crash() {
        let mut app = App::new();
        app.product_id_input.insert_str("abc");
        app.quantity_input.insert_str("5");

        assert_eq!(app.stock_update_args(), None);
        let modal = app.modal.as_ref().unwrap();
        assert_eq!(modal.kind, ModalKind::Error);
        assert!(modal.message.contains("Product id"));
        assert!(app.output.is_empty());
    }

    #[test]
    fn valid_stock_inputs_parse_to_integers() {
        let mut app = App::new();
        app.product_id_input.insert_str("42");
        app.quantity_input.insert_str("7");

        assert_eq!(app.stock_update_args(), Some((42, 7)));
        assert!(app.modal.is_none());
    }

    #[test]
    fn missing_vat_rate_warns() {
        let mut app = App::new();
        app.price_input.insert_str("100");

        assert_eq!(app.vat_args(), None);
        assert_eq!(app.modal.as_ref().unwrap().kind, ModalKind::Warning);
    }

    #[test]
    fn vat_inputs_pass_through_exactly_as_typed() {
        let mut app = App::new();
        app.price_input.insert_str("100");
        app.vat_rate_input.insert_str("0.23");

        assert_eq!(
            app.vat_args(),
            Some(("100".to_string(), "0.23".to_string()))
        );
    }

    #[test]
    fn modal_helpers_set_kind_and_close_clears() {
        let mut app = App::new();
        app.show_warning("Missing input", "Fill in all the fields.");
        assert_eq!(app.modal.as_ref().unwrap().kind, ModalKind::Warning);

        app.show_error("boom");
        assert_eq!(app.modal.as_ref().unwrap().kind, ModalKind::Error);

        app.close_modal();
        assert!(app.modal.is_none());
    }
}
