pub mod components;
pub mod config;
pub mod gui;
pub mod logging;

use gpui::{App, actions};
pub use gui::{open_main_window, setup_app};
use tracing::info;

actions!(cotizador, [Quit]);

// Takes a reference to the action (often unused) and mutable app context
pub fn quit(
    _: &Quit,
    cx: &mut App,
) {
    info!("Executing quit handler");
    logging::disable_file_logging();
    cx.quit();
}
