mod connect;
mod form;
mod modal;
mod output;
mod results;
pub mod theme;

pub use connect::render_connect_dialog;
pub use form::{ActionButton, ButtonRegion, render_form};
pub use modal::render_modal;
pub use output::render_output;
pub use results::render_results;
pub use theme::Theme;
