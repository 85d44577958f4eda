mod app;
mod db;
mod export;
mod storage;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
};

use app::{App, AppState, ConnectionFocus, Focus, FormField};
use db::BackofficeDb;
use export::export_all_tables;
use storage::Storage;
use ui::{
    ActionButton, Theme, render_connect_dialog, render_form, render_modal, render_output,
    render_results,
};

#[tokio::main]
async fn main() -> Result<()> {
    let storage = Storage::new().await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let theme = Theme::default();

    if let Ok(recent) = storage.get_recent_connections(10).await {
        app.set_recent_connections(recent);
    }

    let result = run_app(&mut terminal, &mut app, &storage, &theme).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }

    Ok(())
}

fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_>,
    storage: &Storage,
    theme: &Theme,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            match app.state {
                AppState::Connect => {
                    render_connect_dialog(
                        frame,
                        &app.connection_input,
                        app.connection_error.as_deref(),
                        &app.recent_connections,
                        &mut app.recent_connections_state,
                        app.connection_focus,
                        theme,
                    );
                }
                AppState::Backoffice => {
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([
                            Constraint::Length(7),
                            Constraint::Min(8),
                            Constraint::Length(4),
                        ])
                        .split(frame.area());

                    let focused_field = match app.focus {
                        Focus::Field(field) => Some(field),
                        _ => None,
                    };
                    let button_region = render_form(
                        frame,
                        chunks[0],
                        &app.product_id_input,
                        &app.quantity_input,
                        &app.price_input,
                        &app.vat_rate_input,
                        focused_field,
                        app.selected_button,
                        app.hovered_button,
                        theme,
                    );
                    app.button_region = Some(button_region);

                    render_results(
                        frame,
                        chunks[1],
                        &app.results,
                        &mut app.results_state,
                        app.focus == Focus::Results,
                        theme,
                    );

                    render_output(frame, chunks[2], &app.output, theme);
                }
            }

            if let Some(modal) = &app.modal {
                render_modal(frame, modal, theme);
            }
        })?;

        if let Some(event) = poll_event(Duration::from_millis(50))? {
            if app.modal.is_some() {
                // Blocking dialog: nothing else reacts until it is dismissed.
                if let Event::Key(key) = event {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                        app.close_modal();
                    }
                }
            } else {
                match app.state {
                    AppState::Connect => {
                        handle_connect_event(app, storage, event).await;
                    }
                    AppState::Backoffice => {
                        handle_backoffice_event(app, event).await;
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_connect_event(app: &mut App<'_>, storage: &Storage, event: Event) {
    if let Event::Key(key) = event {
        match key.code {
            KeyCode::Esc => {
                app.should_quit = true;
            }
            KeyCode::Tab => {
                app.toggle_connection_focus();
            }
            KeyCode::Enter => {
                let conn_str = match app.connection_focus {
                    ConnectionFocus::RecentList => app
                        .get_selected_recent_connection()
                        .map(|c| c.connection_string.clone()),
                    ConnectionFocus::NewInput => {
                        let input = app.connection_input.lines().join("");
                        if input.is_empty() { None } else { Some(input) }
                    }
                };

                if let Some(conn_str) = conn_str {
                    match BackofficeDb::connect(&conn_str).await {
                        Ok(db) => {
                            let _ = storage.add_connection(&conn_str).await;
                            app.db = Some(db);
                            app.connection_error = None;
                            app.state = AppState::Backoffice;
                            app.focus = Focus::Field(FormField::ProductId);
                        }
                        Err(e) => {
                            app.connection_error = Some(e.to_string());
                        }
                    }
                }
            }
            KeyCode::Delete | KeyCode::Backspace
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                if app.connection_focus == ConnectionFocus::RecentList {
                    if let Some(conn) = app.get_selected_recent_connection() {
                        let id = conn.id;
                        let _ = storage.delete_connection(id).await;
                        if let Ok(recent) = storage.get_recent_connections(10).await {
                            app.set_recent_connections(recent);
                        }
                    }
                }
            }
            KeyCode::Down if app.connection_focus == ConnectionFocus::RecentList => {
                app.select_next_recent();
            }
            KeyCode::Up if app.connection_focus == ConnectionFocus::RecentList => {
                app.select_prev_recent();
            }
            _ => {
                if app.connection_focus == ConnectionFocus::NewInput {
                    app.connection_input.input(event);
                }
            }
        }
    }
}

async fn handle_backoffice_event(app: &mut App<'_>, event: Event) {
    match event {
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let button = app
                    .button_region
                    .as_ref()
                    .map(|region| region.hit_test(mouse.column, mouse.row))
                    .unwrap_or(ActionButton::None);
                if button != ActionButton::None {
                    run_action(app, button).await;
                }
            }
            MouseEventKind::Moved => {
                if let Some(region) = &app.button_region {
                    app.hovered_button = region.hit_test(mouse.column, mouse.row);
                }
            }
            MouseEventKind::ScrollUp => {
                if app.focus == Focus::Results {
                    app.select_prev_row();
                }
            }
            MouseEventKind::ScrollDown => {
                if app.focus == Focus::Results {
                    app.select_next_row();
                }
            }
            _ => {}
        },
        Event::Key(key) => {
            if key.code == KeyCode::Esc {
                app.should_quit = true;
            } else if key.code == KeyCode::Tab {
                app.cycle_focus();
            } else {
                match app.focus {
                    Focus::Field(field) => {
                        if key.code == KeyCode::Enter {
                            // Enter in an input pair fires its action.
                            let button = match field {
                                FormField::ProductId | FormField::Quantity => {
                                    ActionButton::UpdateQuantity
                                }
                                FormField::Price | FormField::VatRate => {
                                    ActionButton::PriceWithVat
                                }
                            };
                            run_action(app, button).await;
                        } else {
                            app.field_input(field).input(Event::Key(key));
                        }
                    }
                    Focus::Buttons => match key.code {
                        KeyCode::Left => {
                            app.cycle_button_reverse();
                        }
                        KeyCode::Right => {
                            app.cycle_button();
                        }
                        KeyCode::Enter => {
                            run_action(app, app.selected_button).await;
                        }
                        _ => {}
                    },
                    Focus::Results => match key.code {
                        KeyCode::Down | KeyCode::Char('j') => {
                            app.select_next_row();
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            app.select_prev_row();
                        }
                        _ => {}
                    },
                }
            }
        }
        _ => {}
    }
}

async fn run_action(app: &mut App<'_>, button: ActionButton) {
    match button {
        ActionButton::ActiveBooks => show_active_books(app).await,
        ActionButton::UpdateQuantity => update_quantity(app).await,
        ActionButton::PriceWithVat => price_with_vat(app).await,
        ActionButton::ExportCsv => export_csv(app).await,
        ActionButton::None => {}
    }
}

async fn show_active_books(app: &mut App<'_>) {
    let Some(db) = &app.db else { return };
    match db.active_books().await {
        Ok(result) => {
            app.output = format!("{} active books listed.", result.rows.len());
            app.set_results(result);
        }
        Err(e) => {
            app.show_error(e.to_string());
        }
    }
}

async fn update_quantity(app: &mut App<'_>) {
    let Some((product_id, quantity)) = app.stock_update_args() else {
        return;
    };

    let Some(db) = &app.db else { return };
    match db.update_quantity(product_id, quantity).await {
        Ok(()) => {
            app.output = format!("Quantity of product {product_id} set to {quantity}.");
        }
        Err(e) => {
            app.show_error(e.to_string());
        }
    }
}

async fn price_with_vat(app: &mut App<'_>) {
    let Some((price, vat_rate)) = app.vat_args() else {
        return;
    };

    let Some(db) = &app.db else { return };
    match db.price_with_vat(&price, &vat_rate).await {
        Ok(value) => {
            app.output = format!("Price with VAT: {value}");
        }
        Err(e) => {
            app.show_error(e.to_string());
        }
    }
}

async fn export_csv(app: &mut App<'_>) {
    let dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            app.show_error(e.to_string());
            return;
        }
    };

    let Some(db) = &app.db else { return };
    let report = export_all_tables(db, &dir).await;

    let finished = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    app.output = format!("{} ({finished})", report.summary());

    if report.is_success() {
        app.show_info("Export", "All tables exported to CSV.");
    } else {
        app.show_warning(
            "Export",
            format!("Failed to export: {}", report.failed.join(", ")),
        );
    }
}
