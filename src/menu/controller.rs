use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::config::MenuConfig;
use crate::document::{ChangeSet, EditorEvent, EditorHost, EditorSnapshot};
use crate::listeners::ListenerId;
use crate::popover::{PopoverFactory, PopoverHandle, PopoverOptions};
use crate::schedule::{Debouncer, TimerSource};

use super::anchor::{anchor_rect, AnchorOverride};
use super::element::MenuElement;
use super::policy::{MarkVisibilityPolicy, VisibilityContext, VisibilityPolicy};
use super::{ControllerError, ControllerResult};

pub const DEFAULT_UPDATE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Listening,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuVisualState {
    Hidden,
    Shown,
}

/// Collaborators the controller drives but does not own exclusively.
pub struct MenuParts<H: EditorHost> {
    pub host: Rc<H>,
    pub menu: Rc<dyn MenuElement<H::Widget>>,
    pub popovers: Rc<dyn PopoverFactory<H::Widget>>,
    pub timers: Rc<dyn TimerSource>,
}

pub struct ControllerOptions<H: EditorHost> {
    /// Range selections wait this long for quiet before re-evaluating. Zero disables it.
    pub update_delay: Duration,
    /// Defaults to [`MarkVisibilityPolicy`] for links.
    pub policy: Option<Box<dyn VisibilityPolicy<H>>>,
    pub anchor_override: Option<AnchorOverride<H>>,
    pub popover: PopoverOptions,
}

impl<H: EditorHost> Default for ControllerOptions<H> {
    fn default() -> Self {
        Self {
            update_delay: DEFAULT_UPDATE_DELAY,
            policy: None,
            anchor_override: None,
            popover: PopoverOptions::default(),
        }
    }
}

impl<H: EditorHost> ControllerOptions<H> {
    pub fn from_config(config: &MenuConfig) -> Self {
        Self {
            update_delay: Duration::from_millis(config.update_delay_ms),
            policy: Some(Box::new(MarkVisibilityPolicy::new(config.mark_type.as_str()))),
            anchor_override: None,
            popover: config.popover.clone(),
        }
    }
}

struct Shared<H: EditorHost> {
    host: Rc<H>,
    menu: Rc<dyn MenuElement<H::Widget>>,
    popovers: Rc<dyn PopoverFactory<H::Widget>>,
    policy: Box<dyn VisibilityPolicy<H>>,
    anchor_override: Option<AnchorOverride<H>>,
    update_delay: Duration,
    popover_options: PopoverOptions,

    popover: RefCell<Option<Rc<dyn PopoverHandle<H::Widget>>>>,
    popover_blur: Cell<Option<ListenerId>>,
    visual: Cell<MenuVisualState>,
    /// Set by a press inside the menu; swallows the blur that press causes.
    prevent_hide: Cell<bool>,
    previous: RefCell<Option<EditorSnapshot>>,
    updates: Debouncer,
    focus_settle: Debouncer,
    host_listener: Cell<Option<ListenerId>>,
    pointer_listener: Cell<Option<ListenerId>>,
    lifecycle: Cell<ControllerState>,
}

/// Keeps a popover next to the selection while the visibility policy allows it.
///
/// All subscriptions are released by [`FloatingMenuController::destroy`], which
/// also runs on drop. Callbacks that fire afterwards are inert.
pub struct FloatingMenuController<H: EditorHost + 'static> {
    shared: Rc<Shared<H>>,
}

impl<H: EditorHost + 'static> FloatingMenuController<H> {
    pub fn new(parts: MenuParts<H>, options: ControllerOptions<H>) -> ControllerResult<Self> {
        if parts.host.is_destroyed() {
            tracing::warn!("refusing to attach floating menu to a destroyed editor");
            return Err(ControllerError::EditorDestroyed);
        }

        let policy = options
            .policy
            .unwrap_or_else(|| Box::new(MarkVisibilityPolicy::default()));
        let shared = Rc::new(Shared {
            host: parts.host,
            menu: parts.menu,
            popovers: parts.popovers,
            policy,
            anchor_override: options.anchor_override,
            update_delay: options.update_delay,
            popover_options: options.popover,
            popover: RefCell::new(None),
            popover_blur: Cell::new(None),
            visual: Cell::new(MenuVisualState::Hidden),
            prevent_hide: Cell::new(false),
            previous: RefCell::new(None),
            updates: Debouncer::new(parts.timers.clone()),
            focus_settle: Debouncer::new(parts.timers),
            host_listener: Cell::new(None),
            pointer_listener: Cell::new(None),
            lifecycle: Cell::new(ControllerState::Uninitialized),
        });

        let weak = Rc::downgrade(&shared);
        let host_listener = shared
            .host
            .subscribe(Rc::new(move |event: &EditorEvent<H::Widget>| {
                if let Some(shared) = weak.upgrade() {
                    shared.handle_event(event);
                }
            }));
        shared.host_listener.set(Some(host_listener));

        let weak = Rc::downgrade(&shared);
        let pointer_listener = shared.menu.connect_pointer_down(Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                if shared.is_listening() {
                    shared.prevent_hide.set(true);
                }
            }
        }));
        shared.pointer_listener.set(Some(pointer_listener));

        shared.lifecycle.set(ControllerState::Listening);
        tracing::debug!(
            update_delay_ms = shared.update_delay.as_millis() as u64,
            "floating menu controller listening"
        );
        Ok(Self { shared })
    }

    pub fn state(&self) -> ControllerState {
        self.shared.lifecycle.get()
    }

    pub fn visual_state(&self) -> MenuVisualState {
        self.shared.visual.get()
    }

    pub fn is_shown(&self) -> bool {
        self.visual_state() == MenuVisualState::Shown
    }

    pub fn update_delay(&self) -> Duration {
        self.shared.update_delay
    }

    /// Recomputes the anchor of a shown menu, e.g. after scrolling.
    pub fn reposition(&self) {
        self.shared.reposition();
    }

    /// Tears down the popover, then every listener. Safe to call repeatedly.
    pub fn destroy(&self) {
        self.shared.destroy();
    }
}

impl<H: EditorHost + 'static> Drop for FloatingMenuController<H> {
    fn drop(&mut self) {
        self.shared.destroy();
    }
}

const fn event_name<W>(event: &EditorEvent<W>) -> &'static str {
    match event {
        EditorEvent::Focus => "focus",
        EditorEvent::Blur { .. } => "blur",
        EditorEvent::SelectionChanged => "selection_changed",
        EditorEvent::DocumentChanged => "document_changed",
        EditorEvent::DragStart => "drag_start",
    }
}

impl<H: EditorHost + 'static> Shared<H> {
    fn is_listening(&self) -> bool {
        self.lifecycle.get() == ControllerState::Listening
    }

    fn handle_event(self: &Rc<Self>, event: &EditorEvent<H::Widget>) {
        if !self.is_listening() {
            return;
        }
        tracing::trace!(event = event_name(event), "floating menu event");
        match event {
            EditorEvent::Focus => self.schedule_focus_update(),
            EditorEvent::Blur { related } => self.handle_blur(related.as_ref()),
            EditorEvent::SelectionChanged | EditorEvent::DocumentChanged => {
                let previous = self.previous.borrow().clone();
                self.update(previous);
            }
            EditorEvent::DragStart => self.hide(),
        }
    }

    fn schedule_focus_update(self: &Rc<Self>) {
        // Selection settles only after the focus transition completes.
        let weak = Rc::downgrade(self);
        self.focus_settle.schedule(Duration::ZERO, move || {
            if let Some(shared) = weak.upgrade() {
                shared.update(None);
            }
        });
    }

    fn handle_blur(&self, related: Option<&H::Widget>) {
        if self.prevent_hide.replace(false) {
            tracing::trace!("blur caused by a press inside the menu; keeping it open");
            return;
        }
        if related.is_some_and(|target| self.menu.parent_contains(target)) {
            return;
        }
        self.hide();
    }

    fn update(self: &Rc<Self>, previous: Option<EditorSnapshot>) {
        if !self.is_listening() {
            return;
        }
        let current = self.host.snapshot();
        let changes = ChangeSet::between(previous.as_ref(), &current);
        let range = current.selection.bounds();
        self.previous.replace(Some(current));

        if !self.update_delay.is_zero() && !range.is_collapsed() {
            if !changes.any() {
                return;
            }
            let weak = Rc::downgrade(self);
            self.updates.schedule(self.update_delay, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.evaluate(changes, previous.as_ref());
                }
            });
            return;
        }

        self.updates.cancel();
        self.evaluate(changes, previous.as_ref());
    }

    fn evaluate(self: &Rc<Self>, changes: ChangeSet, previous: Option<&EditorSnapshot>) {
        if !self.is_listening() {
            return;
        }
        // A press that no blur followed must not swallow a later one.
        if self.prevent_hide.replace(false) {
            tracing::trace!("clearing menu press that caused no blur");
        }
        if self.host.is_composing() || !changes.any() {
            tracing::trace!(
                composing = self.host.is_composing(),
                ?changes,
                "skipping floating menu evaluation"
            );
            return;
        }

        self.ensure_popover();

        let state = self.host.snapshot();
        let range = state.selection.bounds();
        let visible = {
            let context = VisibilityContext {
                host: &*self.host,
                state: &state,
                previous,
                from: range.from,
                to: range.to,
                menu: &*self.menu,
            };
            self.policy.should_show(&context)
        };
        if !visible {
            self.hide();
            return;
        }

        let rect = anchor_rect(
            &*self.host,
            &state.selection,
            range,
            self.anchor_override.as_ref(),
            self.menu.scale_factor(),
        );
        if let Some(popover) = self.current_popover() {
            popover.set_anchor_rect(rect);
        }
        self.show();
    }

    fn ensure_popover(self: &Rc<Self>) {
        if self.popover.borrow().is_some() {
            return;
        }
        if !self.host.is_attached() {
            tracing::debug!("editor root is detached; deferring popover creation");
            return;
        }

        let popover = self
            .popovers
            .create(&self.host.root(), &self.popover_options);
        let weak = Rc::downgrade(self);
        let blur = popover.connect_blur(Rc::new(move |related: Option<&H::Widget>| {
            if let Some(shared) = weak.upgrade() {
                if shared.is_listening() {
                    shared.handle_blur(related);
                }
            }
        }));
        self.popover_blur.set(blur);
        self.popover.replace(Some(popover));
        tracing::debug!("created floating menu popover");
    }

    fn current_popover(&self) -> Option<Rc<dyn PopoverHandle<H::Widget>>> {
        self.popover.borrow().clone()
    }

    fn show(&self) {
        let Some(popover) = self.current_popover() else {
            return;
        };
        if self.visual.replace(MenuVisualState::Shown) == MenuVisualState::Shown {
            return;
        }
        tracing::debug!("showing floating menu");
        popover.show();
    }

    fn hide(&self) {
        if self.visual.replace(MenuVisualState::Hidden) == MenuVisualState::Hidden {
            return;
        }
        tracing::debug!("hiding floating menu");
        if let Some(popover) = self.current_popover() {
            popover.hide();
        }
    }

    fn reposition(&self) {
        if !self.is_listening() || self.visual.get() != MenuVisualState::Shown {
            return;
        }
        let state = self.host.snapshot();
        let rect = anchor_rect(
            &*self.host,
            &state.selection,
            state.selection.bounds(),
            self.anchor_override.as_ref(),
            self.menu.scale_factor(),
        );
        if let Some(popover) = self.current_popover() {
            popover.set_anchor_rect(rect);
        }
    }

    fn destroy(&self) {
        if self.lifecycle.replace(ControllerState::Destroyed) == ControllerState::Destroyed {
            return;
        }
        self.updates.teardown();
        self.focus_settle.teardown();

        // Detach the popover's blur listener before the popover goes away.
        let popover = self.popover.borrow_mut().take();
        if let Some(popover) = popover {
            if let Some(id) = self.popover_blur.take() {
                popover.disconnect_blur(id);
            }
            popover.destroy();
        }
        self.visual.set(MenuVisualState::Hidden);
        self.prevent_hide.set(false);

        if let Some(id) = self.host_listener.take() {
            self.host.unsubscribe(id);
        }
        if let Some(id) = self.pointer_listener.take() {
            self.menu.disconnect_pointer_down(id);
        }
        tracing::debug!("floating menu controller destroyed");
    }
}
