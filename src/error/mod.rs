use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::menu::{ActionError, ControllerError, OpenLinkError};
use crate::state::StateError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Open(#[from] OpenLinkError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialise GTK")]
    GtkInit(#[source] gtk4::glib::BoolError),
}
