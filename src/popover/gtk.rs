use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gdk, EventControllerFocus, Popover, PositionType, Widget};

use crate::geometry::AnchorRect;
use crate::listeners::{ListenerId, ListenerSet};

use super::{BlurListener, Placement, PopoverFactory, PopoverHandle, PopoverOptions};

/// Builds `GtkPopover`s around a fixed content widget.
pub struct GtkPopoverFactory {
    content: Widget,
}

impl GtkPopoverFactory {
    pub fn new(content: &impl IsA<Widget>) -> Self {
        Self {
            content: content.clone().upcast(),
        }
    }
}

const fn position_for(placement: Placement) -> PositionType {
    match placement {
        Placement::Top => PositionType::Top,
        Placement::Bottom => PositionType::Bottom,
        Placement::Left => PositionType::Left,
        Placement::Right => PositionType::Right,
    }
}

impl PopoverFactory<Widget> for GtkPopoverFactory {
    fn create(&self, root: &Widget, options: &PopoverOptions) -> Rc<dyn PopoverHandle<Widget>> {
        if self.content.parent().is_some() {
            tracing::warn!("menu content is still parented elsewhere; detaching it");
            self.content.unparent();
        }

        let popover = Popover::new();
        popover.set_child(Some(&self.content));
        popover.set_autohide(options.autohide);
        popover.set_has_arrow(options.has_arrow);
        popover.set_position(position_for(options.placement));
        popover.set_parent(root);

        let blur_listeners: Rc<ListenerSet<BlurListener<Widget>>> = Rc::new(ListenerSet::new());
        let focus = EventControllerFocus::new();
        {
            let blur_listeners = blur_listeners.clone();
            let root = root.clone();
            focus.connect_leave(move |_| {
                let related = root.root().and_then(|window| window.focus());
                for listener in blur_listeners.snapshot() {
                    listener(related.as_ref());
                }
            });
        }
        popover.add_controller(focus.clone());

        tracing::debug!(placement = ?options.placement, "created gtk popover");
        Rc::new(GtkPopoverHandle {
            popover,
            focus,
            blur_listeners,
            destroyed: Cell::new(false),
        })
    }
}

struct GtkPopoverHandle {
    popover: Popover,
    focus: EventControllerFocus,
    blur_listeners: Rc<ListenerSet<BlurListener<Widget>>>,
    destroyed: Cell<bool>,
}

impl PopoverHandle<Widget> for GtkPopoverHandle {
    fn show(&self) {
        if !self.destroyed.get() {
            self.popover.popup();
        }
    }

    fn hide(&self) {
        if !self.destroyed.get() {
            self.popover.popdown();
        }
    }

    fn set_anchor_rect(&self, rect: AnchorRect) {
        if self.destroyed.get() {
            return;
        }
        let area = gdk::Rectangle::new(
            rect.left.round() as i32,
            rect.top.round() as i32,
            (rect.width.round() as i32).max(1),
            (rect.height.round() as i32).max(1),
        );
        self.popover.set_pointing_to(Some(&area));
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.blur_listeners.clear();
        self.popover.remove_controller(&self.focus);
        self.popover.popdown();
        self.popover.set_child(None::<&Widget>);
        self.popover.unparent();
    }

    fn connect_blur(&self, listener: Rc<BlurListener<Widget>>) -> Option<ListenerId> {
        if self.destroyed.get() {
            return None;
        }
        Some(self.blur_listeners.add(listener))
    }

    fn disconnect_blur(&self, id: ListenerId) {
        self.blur_listeners.remove(id);
    }
}
