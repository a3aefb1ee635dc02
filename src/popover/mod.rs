//! The popover primitive the menu content is mounted into.

mod gtk;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::AnchorRect;
use crate::listeners::ListenerId;

pub use gtk::GtkPopoverFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverOptions {
    pub placement: Placement,
    pub has_arrow: bool,
    /// Close when the user clicks outside the popover.
    pub autohide: bool,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            has_arrow: true,
            autohide: false,
        }
    }
}

/// Receives whatever takes focus when the popover content loses it.
pub type BlurListener<W> = dyn Fn(Option<&W>);

/// A live popover. Only the controller that created it may drive it.
pub trait PopoverHandle<W> {
    fn show(&self);
    fn hide(&self);
    fn set_anchor_rect(&self, rect: AnchorRect);
    /// Further calls on a destroyed handle are ignored.
    fn destroy(&self);

    /// `None` when the popover has no focusable content to watch.
    fn connect_blur(&self, listener: Rc<BlurListener<W>>) -> Option<ListenerId>;
    fn disconnect_blur(&self, id: ListenerId);
}

pub trait PopoverFactory<W> {
    fn create(&self, root: &W, options: &PopoverOptions) -> Rc<dyn PopoverHandle<W>>;
}
