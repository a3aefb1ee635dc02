use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{EventControllerFocus, GestureDrag, PropagationPhase, TextTag, TextView, TextWindowType};

use crate::geometry::Coords;
use crate::listeners::{ListenerId, ListenerSet};

use super::{
    DocumentError, DocumentResult, EditorEvent, EditorHost, EditorListener, Mark, Selection,
};

const LINK_MARK: &str = "link";
const HREF_ATTRIBUTE: &str = "href";
const LINK_TAG_PREFIX: &str = "markmenu-link-";
const LINK_FOREGROUND: &str = "#1c71d8";

#[derive(Default)]
struct HostSignals {
    listeners: ListenerSet<EditorListener<gtk4::Widget>>,
    revision: Cell<u64>,
    composing: Cell<bool>,
    last_selection: RefCell<Option<Selection>>,
}

impl HostSignals {
    fn emit(&self, event: EditorEvent<gtk4::Widget>) {
        for listener in self.listeners.snapshot() {
            listener(&event);
        }
    }
}

/// Editor host over a GTK `TextView`, with links stored as text tags.
pub struct TextViewHost {
    view: TextView,
    signals: Rc<HostSignals>,
    hrefs: RefCell<HashMap<String, String>>,
    next_tag: Cell<u64>,
    buffer_handlers: RefCell<Vec<gtk4::glib::SignalHandlerId>>,
    preedit_handler: RefCell<Option<gtk4::glib::SignalHandlerId>>,
    focus_controller: EventControllerFocus,
    drag_gesture: GestureDrag,
    detached: Cell<bool>,
}

impl TextViewHost {
    pub fn new(view: &TextView) -> Self {
        let signals = Rc::new(HostSignals::default());
        let buffer = view.buffer();

        let changed = {
            let signals = signals.clone();
            buffer.connect_changed(move |_| {
                signals.revision.set(signals.revision.get() + 1);
                signals.emit(EditorEvent::DocumentChanged);
            })
        };
        let mark_set = {
            let signals = signals.clone();
            buffer.connect_mark_set(move |buffer, _, mark| {
                let name = mark.name();
                if !matches!(name.as_deref(), Some("insert") | Some("selection_bound")) {
                    return;
                }
                let selection = selection_of(buffer);
                let previous = signals.last_selection.replace(Some(selection.clone()));
                if previous.as_ref() != Some(&selection) {
                    signals.emit(EditorEvent::SelectionChanged);
                }
            })
        };
        let preedit = {
            let signals = signals.clone();
            view.connect_preedit_changed(move |_, preedit| {
                signals.composing.set(!preedit.is_empty());
            })
        };

        let focus_controller = EventControllerFocus::new();
        {
            let signals = signals.clone();
            focus_controller.connect_enter(move |_| signals.emit(EditorEvent::Focus));
        }
        {
            let signals = signals.clone();
            let view = view.clone();
            focus_controller.connect_leave(move |_| {
                let related = view.root().and_then(|root| root.focus());
                signals.emit(EditorEvent::Blur { related });
            });
        }
        view.add_controller(focus_controller.clone());

        // Pressing inside the current selection and dragging starts a text DnD.
        let drag_gesture = GestureDrag::new();
        drag_gesture.set_propagation_phase(PropagationPhase::Capture);
        {
            let signals = signals.clone();
            let view = view.clone();
            drag_gesture.connect_drag_begin(move |_, x, y| {
                let buffer = view.buffer();
                let Some((start, end)) = buffer.selection_bounds() else {
                    return;
                };
                let (bx, by) =
                    view.window_to_buffer_coords(TextWindowType::Widget, x as i32, y as i32);
                let Some(iter) = view.iter_at_location(bx, by) else {
                    return;
                };
                if start.offset() <= iter.offset() && iter.offset() < end.offset() {
                    signals.emit(EditorEvent::DragStart);
                }
            });
        }
        view.add_controller(drag_gesture.clone());

        signals.last_selection.replace(Some(selection_of(&buffer)));

        Self {
            view: view.clone(),
            signals,
            hrefs: RefCell::new(HashMap::new()),
            next_tag: Cell::new(1),
            buffer_handlers: RefCell::new(vec![changed, mark_set]),
            preedit_handler: RefCell::new(Some(preedit)),
            focus_controller,
            drag_gesture,
            detached: Cell::new(false),
        }
    }

    pub fn view(&self) -> &TextView {
        &self.view
    }

    /// Tags the character range `[start, end)` as a link.
    pub fn add_link(&self, start: usize, end: usize, href: &str) {
        let buffer = self.view.buffer();
        let tag = self.new_link_tag(href);
        let start = buffer.iter_at_offset(to_offset(start));
        let end = buffer.iter_at_offset(to_offset(end));
        buffer.apply_tag(&tag, &start, &end);
        self.bump_revision();
    }

    /// Disconnects every signal and controller installed on the view.
    pub fn detach(&self) {
        if self.detached.replace(true) {
            return;
        }
        let buffer = self.view.buffer();
        for handler in self.buffer_handlers.borrow_mut().drain(..) {
            buffer.disconnect(handler);
        }
        if let Some(handler) = self.preedit_handler.borrow_mut().take() {
            self.view.disconnect(handler);
        }
        self.view.remove_controller(&self.focus_controller);
        self.view.remove_controller(&self.drag_gesture);
        self.signals.listeners.clear();
    }

    fn new_link_tag(&self, href: &str) -> TextTag {
        let id = self.next_tag.get();
        self.next_tag.set(id + 1);
        let name = format!("{LINK_TAG_PREFIX}{id}");
        let tag = TextTag::builder()
            .name(name.as_str())
            .underline(gtk4::pango::Underline::Single)
            .foreground(LINK_FOREGROUND)
            .build();
        self.view.buffer().tag_table().add(&tag);
        self.hrefs.borrow_mut().insert(name, href.to_string());
        tag
    }

    fn link_tags_at(&self, position: usize) -> Vec<(TextTag, String)> {
        let buffer = self.view.buffer();
        let iter = buffer.iter_at_offset(to_offset(position));
        let hrefs = self.hrefs.borrow();
        iter.tags()
            .into_iter()
            .filter(|tag| !iter.starts_tag(Some(tag)))
            .filter_map(|tag| {
                let href = hrefs.get(tag.name()?.as_str())?.clone();
                Some((tag, href))
            })
            .collect()
    }

    fn bump_revision(&self) {
        self.signals.revision.set(self.signals.revision.get() + 1);
        self.signals.emit(EditorEvent::DocumentChanged);
    }
}

impl Drop for TextViewHost {
    fn drop(&mut self) {
        self.detach();
    }
}

fn to_offset(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

fn to_position(offset: i32) -> usize {
    usize::try_from(offset).unwrap_or(0)
}

fn selection_of(buffer: &gtk4::TextBuffer) -> Selection {
    match buffer.selection_bounds() {
        Some((start, end)) => Selection::text(to_position(start.offset()), to_position(end.offset())),
        None => Selection::cursor(to_position(buffer.cursor_position())),
    }
}

impl EditorHost for TextViewHost {
    type Widget = gtk4::Widget;

    fn selection(&self) -> Selection {
        selection_of(&self.view.buffer())
    }

    fn revision(&self) -> u64 {
        self.signals.revision.get()
    }

    fn marks_at(&self, position: usize) -> Vec<Mark> {
        self.link_tags_at(position)
            .into_iter()
            .map(|(_, href)| Mark::link(href))
            .collect()
    }

    fn is_editable(&self) -> bool {
        self.view.is_editable()
    }

    fn has_focus(&self) -> bool {
        self.view.has_focus()
    }

    fn is_composing(&self) -> bool {
        self.signals.composing.get()
    }

    fn is_destroyed(&self) -> bool {
        self.detached.get()
    }

    fn root(&self) -> gtk4::Widget {
        self.view.clone().upcast()
    }

    fn is_attached(&self) -> bool {
        self.view.root().is_some()
    }

    fn coords_at_pos(&self, position: usize) -> Coords {
        let iter = self.view.buffer().iter_at_offset(to_offset(position));
        let location = self.view.iter_location(&iter);
        let (x, y) =
            self.view
                .buffer_to_window_coords(TextWindowType::Widget, location.x(), location.y());
        let left = f64::from(x);
        let top = f64::from(y);
        Coords::new(left, left, top, top + f64::from(location.height()))
    }

    fn apply_mark_attribute(
        &self,
        mark_type: &str,
        key: &str,
        value: &str,
        extend_to_mark_boundaries: bool,
    ) -> DocumentResult<()> {
        if !self.view.is_editable() {
            return Err(DocumentError::NotEditable);
        }
        if mark_type != LINK_MARK || key != HREF_ATTRIBUTE {
            tracing::warn!(mark_type, key, "text view host only stores link hrefs");
            return Ok(());
        }

        let selection = self.selection().bounds();
        let tags = self.link_tags_at(selection.from);
        if tags.is_empty() {
            tracing::debug!(position = selection.from, "no link at selection; nothing to update");
            return Ok(());
        }

        if extend_to_mark_boundaries {
            let mut hrefs = self.hrefs.borrow_mut();
            for (tag, _) in &tags {
                if let Some(name) = tag.name() {
                    hrefs.insert(name.to_string(), value.to_string());
                }
            }
        } else if !selection.is_collapsed() {
            let buffer = self.view.buffer();
            let start = buffer.iter_at_offset(to_offset(selection.from));
            let end = buffer.iter_at_offset(to_offset(selection.to));
            for (tag, _) in &tags {
                buffer.remove_tag(tag, &start, &end);
            }
            let replacement = self.new_link_tag(value);
            buffer.apply_tag(&replacement, &start, &end);
        } else {
            return Ok(());
        }

        self.bump_revision();
        Ok(())
    }

    fn subscribe(&self, listener: Rc<EditorListener<gtk4::Widget>>) -> ListenerId {
        self.signals.listeners.add(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.signals.listeners.remove(id);
    }
}
