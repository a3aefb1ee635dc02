//! The floating link menu: when it shows, where it points, and what its buttons do.

mod actions;
mod anchor;
mod controller;
mod element;
mod opener;
mod policy;

use thiserror::Error;

pub use actions::{ActionError, ActionResult, LinkActions, MarkTarget};
pub use anchor::{anchor_rect, rect_for_range, AnchorOverride};
pub use controller::{
    ControllerOptions, ControllerState, FloatingMenuController, MenuParts, MenuVisualState,
    DEFAULT_UPDATE_DELAY,
};
pub use element::{GtkMenuElement, MenuElement, PointerListener};
pub use opener::{GioLinkOpener, LinkOpener, OpenLinkError};
pub use policy::{MarkVisibilityPolicy, VisibilityContext, VisibilityPolicy};

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("editor was destroyed before the floating menu could attach")]
    EditorDestroyed,
}
