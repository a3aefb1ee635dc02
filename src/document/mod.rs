//! Boundary to the rich-text editor the menu floats over.
//!
//! The editor is a black box: the menu only reads selection, marks, focus and
//! geometry from it, and writes back a single mark attribute on confirm.

mod memory;
mod text_view;

use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;

use crate::geometry::{AnchorRect, Coords};
use crate::listeners::ListenerId;

pub use memory::{MarkSpan, MemoryDocument, WidgetId};
pub use text_view::TextViewHost;

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document is read-only")]
    NotEditable,
    #[error("position {position} is outside the document (size {size})")]
    PositionOutOfRange { position: usize, size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    pub from: usize,
    pub to: usize,
}

impl SelectionRange {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    pub const fn cursor(position: usize) -> Self {
        Self {
            from: position,
            to: position,
        }
    }

    pub const fn is_collapsed(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    Text,
    /// A single non-text node is selected as a whole.
    Node,
    /// Several disjoint ranges, e.g. table cells.
    Cell,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    kind: SelectionKind,
    ranges: Vec<SelectionRange>,
}

impl Selection {
    pub fn cursor(position: usize) -> Self {
        Self::text(position, position)
    }

    pub fn text(anchor: usize, head: usize) -> Self {
        Self {
            kind: SelectionKind::Text,
            ranges: vec![SelectionRange::new(anchor, head)],
        }
    }

    pub fn node(position: usize, node_size: usize) -> Self {
        Self {
            kind: SelectionKind::Node,
            ranges: vec![SelectionRange::new(position, position + node_size.max(1))],
        }
    }

    /// Falls back to a cursor at 0 when `ranges` is empty.
    pub fn cells(ranges: Vec<SelectionRange>) -> Self {
        if ranges.is_empty() {
            return Self::cursor(0);
        }
        Self {
            kind: SelectionKind::Cell,
            ranges,
        }
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn is_node_selection(&self) -> bool {
        self.kind == SelectionKind::Node
    }

    /// Bounding range over every sub-range.
    pub fn bounds(&self) -> SelectionRange {
        let from = self.ranges.iter().map(|range| range.from).min().unwrap_or(0);
        let to = self.ranges.iter().map(|range| range.to).max().unwrap_or(from);
        SelectionRange { from, to }
    }

    pub fn is_collapsed(&self) -> bool {
        self.bounds().is_collapsed()
    }
}

/// Inline annotation such as a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mark {
    pub kind: String,
    pub attrs: BTreeMap<String, String>,
}

impl Mark {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::new("link").with_attr("href", href)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Rendered box of a node under a node selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedNode {
    pub bounds: AnchorRect,
    /// Set when the node is (or contains) a decorative node-view wrapper.
    pub view_wrapper: Option<NodeViewWrapper>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeViewWrapper {
    pub first_child: Option<AnchorRect>,
}

/// What the menu remembers between evaluations to detect change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
    pub selection: Selection,
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSet {
    pub selection_changed: bool,
    pub doc_changed: bool,
}

impl ChangeSet {
    /// Without a previous snapshot everything counts as changed.
    pub fn between(previous: Option<&EditorSnapshot>, current: &EditorSnapshot) -> Self {
        match previous {
            Some(previous) => Self {
                selection_changed: previous.selection != current.selection,
                doc_changed: previous.revision != current.revision,
            },
            None => Self {
                selection_changed: true,
                doc_changed: true,
            },
        }
    }

    pub fn any(&self) -> bool {
        self.selection_changed || self.doc_changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent<W> {
    Focus,
    /// `related` is whatever receives focus next, when known.
    Blur { related: Option<W> },
    SelectionChanged,
    DocumentChanged,
    DragStart,
}

pub type EditorListener<W> = dyn Fn(&EditorEvent<W>);

/// Editor model and view as seen by the floating menu.
pub trait EditorHost {
    /// Handle type for focusable UI elements.
    type Widget: Clone + 'static;

    fn selection(&self) -> Selection;
    /// Bumped on every document mutation.
    fn revision(&self) -> u64;
    fn marks_at(&self, position: usize) -> Vec<Mark>;
    fn is_editable(&self) -> bool;
    fn has_focus(&self) -> bool;
    fn is_composing(&self) -> bool;
    fn is_destroyed(&self) -> bool {
        false
    }

    /// Element the popover is mounted on.
    fn root(&self) -> Self::Widget;
    /// Whether [`EditorHost::root`] currently sits in a visible window.
    fn is_attached(&self) -> bool;

    fn coords_at_pos(&self, position: usize) -> Coords;
    fn node_at(&self, _position: usize) -> Option<RenderedNode> {
        None
    }

    fn apply_mark_attribute(
        &self,
        mark_type: &str,
        key: &str,
        value: &str,
        extend_to_mark_boundaries: bool,
    ) -> DocumentResult<()>;

    fn subscribe(&self, listener: Rc<EditorListener<Self::Widget>>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);

    fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            selection: self.selection(),
            revision: self.revision(),
        }
    }
}
