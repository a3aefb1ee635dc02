use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{GestureClick, PropagationPhase, Widget};

use crate::geometry::ScaleFactor;
use crate::listeners::{ListenerId, ListenerSet};

pub type PointerListener = dyn Fn();

/// The menu's own content element, as the controller needs to see it.
pub trait MenuElement<W> {
    /// Whether the focused element is the menu or one of its descendants.
    fn has_focus_within(&self) -> bool;
    /// Whether `target` is the menu's parent or inside it.
    fn parent_contains(&self, target: &W) -> bool;
    /// Transform of the container the popover is mounted into.
    fn scale_factor(&self) -> ScaleFactor {
        ScaleFactor::IDENTITY
    }
    /// Pointer presses inside the menu, delivered before any resulting blur.
    fn connect_pointer_down(&self, listener: Rc<PointerListener>) -> ListenerId;
    fn disconnect_pointer_down(&self, id: ListenerId);
}

pub struct GtkMenuElement {
    widget: Widget,
    press: GestureClick,
    listeners: Rc<ListenerSet<PointerListener>>,
}

impl GtkMenuElement {
    pub fn new(widget: &impl IsA<Widget>) -> Self {
        let widget: Widget = widget.clone().upcast();
        let listeners: Rc<ListenerSet<PointerListener>> = Rc::new(ListenerSet::new());

        let press = GestureClick::new();
        press.set_button(0);
        press.set_propagation_phase(PropagationPhase::Capture);
        {
            let listeners = listeners.clone();
            press.connect_pressed(move |_, _, _, _| {
                for listener in listeners.snapshot() {
                    listener();
                }
            });
        }
        widget.add_controller(press.clone());

        Self {
            widget,
            press,
            listeners,
        }
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }
}

impl Drop for GtkMenuElement {
    fn drop(&mut self) {
        self.listeners.clear();
        self.widget.remove_controller(&self.press);
    }
}

impl MenuElement<Widget> for GtkMenuElement {
    fn has_focus_within(&self) -> bool {
        self.widget
            .root()
            .and_then(|root| root.focus())
            .is_some_and(|focus| focus == self.widget || focus.is_ancestor(&self.widget))
    }

    fn parent_contains(&self, target: &Widget) -> bool {
        self.widget
            .parent()
            .is_some_and(|parent| *target == parent || target.is_ancestor(&parent))
    }

    fn scale_factor(&self) -> ScaleFactor {
        let Some(root) = self.widget.root() else {
            return ScaleFactor::IDENTITY;
        };
        let Some(bounds) = self.widget.compute_bounds(&root) else {
            return ScaleFactor::IDENTITY;
        };
        ScaleFactor::from_boxes(
            f64::from(bounds.width()),
            f64::from(bounds.height()),
            f64::from(self.widget.width()),
            f64::from(self.widget.height()),
        )
    }

    fn connect_pointer_down(&self, listener: Rc<PointerListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn disconnect_pointer_down(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}
