pub mod app;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod listeners;
pub mod logging;
pub mod menu;
pub mod popover;
pub mod schedule;
pub mod state;
pub mod ui;

#[cfg(test)]
mod testing;

pub use error::{AppError, AppResult};

/// Entrypoint used by the `markmenu` binary.
pub fn run() -> AppResult<gtk4::glib::ExitCode> {
    logging::init();
    tracing::info!("starting markmenu");

    let app = app::App::new();
    let exit_code = app.start()?;

    tracing::info!(?exit_code, "gtk runtime exited");
    Ok(exit_code)
}
