use crate::document::{EditorHost, EditorSnapshot};

use super::element::MenuElement;

/// Everything a visibility decision may look at.
pub struct VisibilityContext<'a, H: EditorHost> {
    pub host: &'a H,
    pub state: &'a EditorSnapshot,
    /// Snapshot from the previous update, if any.
    pub previous: Option<&'a EditorSnapshot>,
    pub from: usize,
    pub to: usize,
    pub menu: &'a dyn MenuElement<H::Widget>,
}

/// Decides whether the menu should be on screen. Must not have side effects.
pub trait VisibilityPolicy<H: EditorHost> {
    fn should_show(&self, context: &VisibilityContext<'_, H>) -> bool;
}

impl<H, F> VisibilityPolicy<H> for F
where
    H: EditorHost,
    F: Fn(&VisibilityContext<'_, H>) -> bool,
{
    fn should_show(&self, context: &VisibilityContext<'_, H>) -> bool {
        self(context)
    }
}

/// Shows the menu for a focused, editable cursor sitting inside a mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkVisibilityPolicy {
    mark_type: String,
}

impl Default for MarkVisibilityPolicy {
    fn default() -> Self {
        Self::new("link")
    }
}

impl MarkVisibilityPolicy {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
        }
    }

    pub fn mark_type(&self) -> &str {
        &self.mark_type
    }
}

impl<H: EditorHost> VisibilityPolicy<H> for MarkVisibilityPolicy {
    fn should_show(&self, context: &VisibilityContext<'_, H>) -> bool {
        let is_cursor = context.from == context.to;
        // Clicking a menu button blurs the editor; focus inside the menu still counts.
        let has_focus = context.host.has_focus() || context.menu.has_focus_within();
        let editable = context.host.is_editable();
        let has_mark = context
            .host
            .marks_at(context.from)
            .iter()
            .any(|mark| mark.is(&self.mark_type));

        tracing::trace!(
            is_cursor,
            has_focus,
            editable,
            has_mark,
            mark_type = %self.mark_type,
            "evaluated mark visibility"
        );
        is_cursor && has_focus && editable && has_mark
    }
}
