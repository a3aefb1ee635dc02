//! Test doubles for the menu element and popover primitive.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::document::WidgetId;
use crate::geometry::{AnchorRect, ScaleFactor};
use crate::listeners::{ListenerId, ListenerSet};
use crate::menu::{MenuElement, PointerListener};
use crate::popover::{BlurListener, PopoverFactory, PopoverHandle, PopoverOptions};

#[derive(Default)]
pub(crate) struct FakeMenuElement {
    focus_within: Cell<bool>,
    parent_children: RefCell<Vec<WidgetId>>,
    scale: Cell<Option<ScaleFactor>>,
    listeners: ListenerSet<PointerListener>,
}

impl FakeMenuElement {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_focus_within(&self, focused: bool) {
        self.focus_within.set(focused);
    }

    pub(crate) fn add_parent_child(&self, widget: WidgetId) {
        self.parent_children.borrow_mut().push(widget);
    }

    pub(crate) fn set_scale(&self, scale: ScaleFactor) {
        self.scale.set(Some(scale));
    }

    pub(crate) fn press(&self) {
        for listener in self.listeners.snapshot() {
            listener();
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl MenuElement<WidgetId> for FakeMenuElement {
    fn has_focus_within(&self) -> bool {
        self.focus_within.get()
    }

    fn parent_contains(&self, target: &WidgetId) -> bool {
        self.parent_children.borrow().contains(target)
    }

    fn scale_factor(&self) -> ScaleFactor {
        self.scale.get().unwrap_or(ScaleFactor::IDENTITY)
    }

    fn connect_pointer_down(&self, listener: Rc<PointerListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn disconnect_pointer_down(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PopoverCall {
    Show,
    Hide,
    Anchor(AnchorRect),
    DisconnectBlur,
    Destroy,
}

#[derive(Default)]
pub(crate) struct RecordingPopover {
    calls: RefCell<Vec<PopoverCall>>,
    blur_listeners: ListenerSet<BlurListener<WidgetId>>,
    destroyed: Cell<bool>,
}

impl RecordingPopover {
    pub(crate) fn calls(&self) -> Vec<PopoverCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn count(&self, call: &PopoverCall) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub(crate) fn last_anchor(&self) -> Option<AnchorRect> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PopoverCall::Anchor(rect) => Some(*rect),
            _ => None,
        })
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub(crate) fn blur_listener_count(&self) -> usize {
        self.blur_listeners.len()
    }

    /// Simulates focus leaving the popover content.
    pub(crate) fn blur(&self, related: Option<WidgetId>) {
        for listener in self.blur_listeners.snapshot() {
            listener(related.as_ref());
        }
    }

    fn record(&self, call: PopoverCall) {
        assert!(
            !self.destroyed.get(),
            "popover used after destroy: {call:?}"
        );
        self.calls.borrow_mut().push(call);
    }
}

impl PopoverHandle<WidgetId> for RecordingPopover {
    fn show(&self) {
        self.record(PopoverCall::Show);
    }

    fn hide(&self) {
        self.record(PopoverCall::Hide);
    }

    fn set_anchor_rect(&self, rect: AnchorRect) {
        self.record(PopoverCall::Anchor(rect));
    }

    fn destroy(&self) {
        self.record(PopoverCall::Destroy);
        self.destroyed.set(true);
    }

    fn connect_blur(&self, listener: Rc<BlurListener<WidgetId>>) -> Option<ListenerId> {
        Some(self.blur_listeners.add(listener))
    }

    fn disconnect_blur(&self, id: ListenerId) {
        self.record(PopoverCall::DisconnectBlur);
        self.blur_listeners.remove(id);
    }
}

#[derive(Default)]
pub(crate) struct RecordingPopoverFactory {
    created: RefCell<Vec<Rc<RecordingPopover>>>,
    options: RefCell<Vec<PopoverOptions>>,
}

impl RecordingPopoverFactory {
    pub(crate) fn created_count(&self) -> usize {
        self.created.borrow().len()
    }

    pub(crate) fn last(&self) -> Option<Rc<RecordingPopover>> {
        self.created.borrow().last().cloned()
    }

    pub(crate) fn last_options(&self) -> Option<PopoverOptions> {
        self.options.borrow().last().cloned()
    }
}

impl PopoverFactory<WidgetId> for RecordingPopoverFactory {
    fn create(&self, root: &WidgetId, options: &PopoverOptions) -> Rc<dyn PopoverHandle<WidgetId>> {
        assert_eq!(*root, WidgetId::EDITOR_ROOT);
        let popover = Rc::new(RecordingPopover::default());
        self.created.borrow_mut().push(popover.clone());
        self.options.borrow_mut().push(options.clone());
        popover
    }
}
