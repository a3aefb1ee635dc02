use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::geometry::Coords;
use crate::listeners::{ListenerId, ListenerSet};

use super::{
    DocumentError, DocumentResult, EditorEvent, EditorHost, EditorListener, Mark, RenderedNode,
    Selection, SelectionRange,
};

/// Focus target identifier for [`MemoryDocument`] hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u32);

impl WidgetId {
    pub const EDITOR_ROOT: Self = Self(0);
}

const DEFAULT_CHAR_WIDTH: f64 = 8.0;
const DEFAULT_LINE_HEIGHT: f64 = 18.0;

/// A mark applied to `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpan {
    pub from: usize,
    pub to: usize,
    pub mark: Mark,
    /// Inclusive marks extend to text typed at their end boundary. Links are not.
    pub inclusive: bool,
}

impl MarkSpan {
    fn is_active_at(&self, position: usize) -> bool {
        if self.from < position && position < self.to {
            return true;
        }
        if !self.inclusive {
            return false;
        }
        position == self.to || (position == 0 && self.from == 0)
    }

    fn overlaps(&self, range: SelectionRange) -> bool {
        self.from < range.to && range.from < self.to
    }
}

#[derive(Debug)]
struct DocumentState {
    text: Vec<char>,
    spans: Vec<MarkSpan>,
    selection: Selection,
    revision: u64,
    editable: bool,
    focused: bool,
    composing: bool,
    attached: bool,
    destroyed: bool,
    nodes: HashMap<usize, RenderedNode>,
    origin: (f64, f64),
    char_width: f64,
    line_height: f64,
}

/// Headless editor host backed by a plain character buffer.
///
/// Geometry follows a fixed monospace grid, which makes it suitable for
/// driving the menu from immediate-mode UIs or from tests.
#[derive(Debug)]
pub struct MemoryDocument {
    state: RefCell<DocumentState>,
    listeners: ListenerSet<EditorListener<WidgetId>>,
}

impl MemoryDocument {
    pub fn new(text: &str) -> Self {
        Self {
            state: RefCell::new(DocumentState {
                text: text.chars().collect(),
                spans: Vec::new(),
                selection: Selection::cursor(0),
                revision: 0,
                editable: true,
                focused: false,
                composing: false,
                attached: true,
                destroyed: false,
                nodes: HashMap::new(),
                origin: (0.0, 0.0),
                char_width: DEFAULT_CHAR_WIDTH,
                line_height: DEFAULT_LINE_HEIGHT,
            }),
            listeners: ListenerSet::new(),
        }
    }

    pub fn with_link(self, from: usize, to: usize, href: &str) -> Self {
        self.add_mark(from, to, Mark::link(href), false);
        self
    }

    pub fn with_layout(self, origin: (f64, f64), char_width: f64, line_height: f64) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.origin = origin;
            state.char_width = char_width;
            state.line_height = line_height;
        }
        self
    }

    pub fn text(&self) -> String {
        self.state.borrow().text.iter().collect()
    }

    pub fn spans(&self) -> Vec<MarkSpan> {
        self.state.borrow().spans.clone()
    }

    pub fn add_mark(&self, from: usize, to: usize, mark: Mark, inclusive: bool) {
        let range = SelectionRange::new(from, to);
        {
            let mut state = self.state.borrow_mut();
            state.spans.push(MarkSpan {
                from: range.from,
                to: range.to,
                mark,
                inclusive,
            });
            state.revision += 1;
        }
        self.emit(EditorEvent::DocumentChanged);
    }

    pub fn insert_text(&self, position: usize, text: &str) -> DocumentResult<()> {
        {
            let mut state = self.state.borrow_mut();
            if !state.editable {
                return Err(DocumentError::NotEditable);
            }
            let size = state.text.len();
            if position > size {
                return Err(DocumentError::PositionOutOfRange { position, size });
            }
            let inserted: Vec<char> = text.chars().collect();
            let count = inserted.len();
            state.text.splice(position..position, inserted);
            for span in &mut state.spans {
                // Only inclusive marks keep hold of text typed at the document start.
                let pinned = position == 0 && span.inclusive;
                if span.from > position || (span.from == position && !pinned) {
                    span.from += count;
                }
                if span.to > position || (span.to == position && span.inclusive) {
                    span.to += count;
                }
            }
            state.revision += 1;
        }
        self.emit(EditorEvent::DocumentChanged);
        Ok(())
    }

    /// Moves the selection; no event fires when it is unchanged.
    pub fn set_selection(&self, selection: Selection) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let clamped = clamp_selection(selection, state.text.len());
            if state.selection == clamped {
                false
            } else {
                state.selection = clamped;
                true
            }
        };
        if changed {
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    pub fn focus(&self) {
        self.state.borrow_mut().focused = true;
        self.emit(EditorEvent::Focus);
    }

    pub fn blur(&self, related: Option<WidgetId>) {
        self.state.borrow_mut().focused = false;
        self.emit(EditorEvent::Blur { related });
    }

    pub fn start_drag(&self) {
        self.emit(EditorEvent::DragStart);
    }

    pub fn set_editable(&self, editable: bool) {
        self.state.borrow_mut().editable = editable;
    }

    pub fn set_composing(&self, composing: bool) {
        self.state.borrow_mut().composing = composing;
    }

    pub fn set_attached(&self, attached: bool) {
        self.state.borrow_mut().attached = attached;
    }

    pub fn set_node(&self, position: usize, node: RenderedNode) {
        self.state.borrow_mut().nodes.insert(position, node);
    }

    /// Marks the editor as gone and drops every subscriber.
    pub fn destroy(&self) {
        self.state.borrow_mut().destroyed = true;
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&self, event: EditorEvent<WidgetId>) {
        if self.state.borrow().destroyed {
            return;
        }
        tracing::trace!(?event, "memory document event");
        for listener in self.listeners.snapshot() {
            listener(&event);
        }
    }
}

fn clamp_selection(selection: Selection, size: usize) -> Selection {
    let clamp = |range: &SelectionRange| SelectionRange::new(range.from.min(size), range.to.min(size));
    match selection.kind() {
        super::SelectionKind::Cell => Selection::cells(selection.ranges().iter().map(clamp).collect()),
        super::SelectionKind::Node => {
            let range = clamp(&selection.bounds());
            Selection::node(range.from, range.to - range.from)
        }
        super::SelectionKind::Text => {
            let range = clamp(&selection.bounds());
            Selection::text(range.from, range.to)
        }
    }
}

impl EditorHost for MemoryDocument {
    type Widget = WidgetId;

    fn selection(&self) -> Selection {
        self.state.borrow().selection.clone()
    }

    fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    fn marks_at(&self, position: usize) -> Vec<Mark> {
        self.state
            .borrow()
            .spans
            .iter()
            .filter(|span| span.is_active_at(position))
            .map(|span| span.mark.clone())
            .collect()
    }

    fn is_editable(&self) -> bool {
        self.state.borrow().editable
    }

    fn has_focus(&self) -> bool {
        self.state.borrow().focused
    }

    fn is_composing(&self) -> bool {
        self.state.borrow().composing
    }

    fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    fn root(&self) -> WidgetId {
        WidgetId::EDITOR_ROOT
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    fn coords_at_pos(&self, position: usize) -> Coords {
        let state = self.state.borrow();
        let position = position.min(state.text.len());
        let mut line = 0_usize;
        let mut column = 0_usize;
        for ch in &state.text[..position] {
            if *ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        let left = state.origin.0 + column as f64 * state.char_width;
        let top = state.origin.1 + line as f64 * state.line_height;
        Coords::new(left, left, top, top + state.line_height)
    }

    fn node_at(&self, position: usize) -> Option<RenderedNode> {
        self.state.borrow().nodes.get(&position).copied()
    }

    fn apply_mark_attribute(
        &self,
        mark_type: &str,
        key: &str,
        value: &str,
        extend_to_mark_boundaries: bool,
    ) -> DocumentResult<()> {
        let updated = {
            let mut state = self.state.borrow_mut();
            if !state.editable {
                return Err(DocumentError::NotEditable);
            }
            let range = state.selection.bounds();
            if extend_to_mark_boundaries {
                update_whole_spans(&mut state.spans, mark_type, key, value, range)
            } else {
                update_within_range(&mut state.spans, mark_type, key, value, range)
            }
        };

        if updated == 0 {
            tracing::debug!(mark_type, key, "no mark at selection; nothing to update");
            return Ok(());
        }
        self.state.borrow_mut().revision += 1;
        self.emit(EditorEvent::DocumentChanged);
        Ok(())
    }

    fn subscribe(&self, listener: Rc<EditorListener<WidgetId>>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

fn update_whole_spans(
    spans: &mut [MarkSpan],
    mark_type: &str,
    key: &str,
    value: &str,
    range: SelectionRange,
) -> usize {
    let mut updated = 0;
    for span in spans.iter_mut().filter(|span| span.mark.is(mark_type)) {
        let hit = if range.is_collapsed() {
            span.is_active_at(range.from)
        } else {
            span.overlaps(range)
        };
        if hit {
            span.mark.attrs.insert(key.to_string(), value.to_string());
            updated += 1;
        }
    }
    updated
}

fn update_within_range(
    spans: &mut Vec<MarkSpan>,
    mark_type: &str,
    key: &str,
    value: &str,
    range: SelectionRange,
) -> usize {
    if range.is_collapsed() {
        return 0;
    }
    let mut updated = 0;
    let mut result = Vec::with_capacity(spans.len() + 2);
    for span in spans.drain(..) {
        if !span.mark.is(mark_type) || !span.overlaps(range) {
            result.push(span);
            continue;
        }
        let inner_from = span.from.max(range.from);
        let inner_to = span.to.min(range.to);
        if span.from < inner_from {
            result.push(MarkSpan {
                to: inner_from,
                ..span.clone()
            });
        }
        let mut inner = MarkSpan {
            from: inner_from,
            to: inner_to,
            ..span.clone()
        };
        inner.mark.attrs.insert(key.to_string(), value.to_string());
        result.push(inner);
        if inner_to < span.to {
            result.push(MarkSpan {
                from: inner_to,
                ..span
            });
        }
        updated += 1;
    }
    *spans = result;
    updated
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    // "Visit example now" with a link over "example".
    fn linked_document() -> MemoryDocument {
        MemoryDocument::new("Visit example now").with_link(6, 13, "https://example.com")
    }

    fn hrefs(document: &MemoryDocument) -> Vec<(usize, usize, String)> {
        document
            .spans()
            .into_iter()
            .map(|span| {
                let href = span.mark.attr("href").unwrap_or_default().to_string();
                (span.from, span.to, href)
            })
            .collect()
    }

    #[test]
    fn non_inclusive_link_is_active_strictly_inside_its_span() {
        let document = linked_document();

        assert!(document.marks_at(6).is_empty());
        assert_eq!(document.marks_at(7), vec![Mark::link("https://example.com")]);
        assert_eq!(document.marks_at(12).len(), 1);
        assert!(document.marks_at(13).is_empty());
    }

    #[test]
    fn inclusive_mark_is_active_at_its_end_boundary() {
        let document = MemoryDocument::new("bold text");
        document.add_mark(0, 4, Mark::new("bold"), true);

        assert_eq!(document.marks_at(0).len(), 1);
        assert_eq!(document.marks_at(4).len(), 1);
        assert!(document.marks_at(5).is_empty());
    }

    #[test]
    fn extended_update_rewrites_the_whole_span_from_a_cursor() {
        let document = linked_document();
        document.set_selection(Selection::cursor(9));

        document
            .apply_mark_attribute("link", "href", "https://example.org", true)
            .expect("update should apply");

        assert_eq!(hrefs(&document), vec![(6, 13, "https://example.org".to_string())]);
    }

    #[test]
    fn unextended_update_splits_the_span_at_the_selection() {
        let document = linked_document();
        document.set_selection(Selection::text(8, 10));

        document
            .apply_mark_attribute("link", "href", "https://split.test", false)
            .expect("update should apply");

        assert_eq!(
            hrefs(&document),
            vec![
                (6, 8, "https://example.com".to_string()),
                (8, 10, "https://split.test".to_string()),
                (10, 13, "https://example.com".to_string()),
            ]
        );
    }

    #[test]
    fn update_bumps_revision_and_notifies_only_when_something_changed() {
        let document = linked_document();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        document.subscribe(Rc::new(move |event: &EditorEvent<WidgetId>| {
            sink.borrow_mut().push(event.clone());
        }));
        let revision = document.revision();

        document.set_selection(Selection::cursor(2));
        document
            .apply_mark_attribute("link", "href", "", true)
            .expect("no-op update is not an error");
        assert_eq!(document.revision(), revision);

        document.set_selection(Selection::cursor(8));
        document
            .apply_mark_attribute("link", "href", "", true)
            .expect("clearing the href is allowed");
        assert_eq!(document.revision(), revision + 1);
        assert_eq!(
            *events.borrow(),
            vec![
                EditorEvent::SelectionChanged,
                EditorEvent::SelectionChanged,
                EditorEvent::DocumentChanged,
            ]
        );
    }

    #[test]
    fn read_only_document_rejects_mutation() {
        let document = linked_document();
        document.set_editable(false);

        let err = document
            .apply_mark_attribute("link", "href", "x", true)
            .expect_err("read-only documents must reject updates");
        assert_eq!(err, DocumentError::NotEditable);
        assert_eq!(
            document.insert_text(0, "a").expect_err("insert should fail"),
            DocumentError::NotEditable
        );
    }

    #[test]
    fn insert_text_shifts_spans_and_rejects_out_of_range_positions() {
        let document = linked_document();

        document.insert_text(0, ">> ").expect("insert at start");
        document.insert_text(16, "!").expect("insert at link end");

        assert_eq!(document.text(), ">> Visit example! now");
        assert_eq!(hrefs(&document)[0].0, 9);
        assert_eq!(hrefs(&document)[0].1, 16);
        assert_eq!(
            document.insert_text(99, "x").expect_err("out of range"),
            DocumentError::PositionOutOfRange {
                position: 99,
                size: 21
            }
        );
    }

    #[test]
    fn typing_before_a_link_at_the_document_start_does_not_extend_it() {
        let document = MemoryDocument::new("link rest").with_link(0, 4, "https://start.test");
        document.add_mark(0, 4, Mark::new("bold"), true);

        document.insert_text(0, "xy").expect("insert at start");

        assert_eq!(document.text(), "xylink rest");
        let spans = document.spans();
        assert_eq!((spans[0].from, spans[0].to), (2, 6));
        assert_eq!((spans[1].from, spans[1].to), (0, 6));
        assert_eq!(document.marks_at(1), vec![Mark::new("bold")]);
        assert_eq!(document.marks_at(3).len(), 2);
    }

    #[test]
    fn coords_follow_monospace_grid_across_lines() {
        let document = MemoryDocument::new("ab\ncdef").with_layout((10.0, 100.0), 5.0, 20.0);

        assert_eq!(document.coords_at_pos(1), Coords::new(15.0, 15.0, 100.0, 120.0));
        assert_eq!(document.coords_at_pos(5), Coords::new(20.0, 20.0, 120.0, 140.0));
        assert_eq!(document.coords_at_pos(99), Coords::new(30.0, 30.0, 120.0, 140.0));
    }

    #[test]
    fn unchanged_selection_does_not_notify_and_destroy_drops_listeners() {
        let document = linked_document();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        document.subscribe(Rc::new(move |_: &EditorEvent<WidgetId>| {
            *sink.borrow_mut() += 1;
        }));

        document.set_selection(Selection::cursor(0));
        assert_eq!(*count.borrow(), 0);

        document.destroy();
        document.focus();
        assert!(document.is_destroyed());
        assert_eq!(document.listener_count(), 0);
        assert_eq!(*count.borrow(), 0);
    }
}
