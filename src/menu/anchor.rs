use crate::document::{EditorHost, RenderedNode, Selection, SelectionRange};
use crate::geometry::{AnchorRect, ScaleFactor};

/// Caller-supplied anchor; wins over the node/range computation.
pub type AnchorOverride<H> = Box<dyn Fn(&H, SelectionRange) -> AnchorRect>;

/// Raw screen rect for the selection, before scale correction.
///
/// Node selections point at the node's rendered box. A node-view wrapper's
/// own box is auxiliary, so its first rendered child is used instead. When no
/// usable node box exists the rect spans the text positions.
pub fn rect_for_range<H: EditorHost>(
    host: &H,
    selection: &Selection,
    range: SelectionRange,
) -> AnchorRect {
    if selection.is_node_selection() {
        if let Some(rect) = node_rect(host.node_at(range.from)) {
            return rect;
        }
        tracing::trace!(position = range.from, "node lookup failed; using text range");
    }
    AnchorRect::spanning(host.coords_at_pos(range.from), host.coords_at_pos(range.to))
}

fn node_rect(node: Option<RenderedNode>) -> Option<AnchorRect> {
    let node = node?;
    match node.view_wrapper {
        Some(wrapper) => wrapper.first_child,
        None => Some(node.bounds),
    }
}

/// Final anchor in the menu container's own coordinate frame.
pub fn anchor_rect<H: EditorHost>(
    host: &H,
    selection: &Selection,
    range: SelectionRange,
    anchor_override: Option<&AnchorOverride<H>>,
    scale: ScaleFactor,
) -> AnchorRect {
    let raw = match anchor_override {
        Some(anchor_override) => anchor_override(host, range),
        None => rect_for_range(host, selection, range),
    };
    raw.unscaled(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, NodeViewWrapper};

    fn document() -> MemoryDocument {
        MemoryDocument::new("one two three").with_layout((100.0, 50.0), 10.0, 20.0)
    }

    #[test]
    fn text_range_spans_both_caret_positions() {
        let document = document();
        let selection = Selection::text(4, 7);

        let rect = rect_for_range(&document, &selection, selection.bounds());

        assert_eq!(rect, AnchorRect::new(140.0, 50.0, 30.0, 20.0));
    }

    #[test]
    fn node_selection_prefers_the_rendered_node() {
        let document = document();
        let node_box = AnchorRect::new(5.0, 6.0, 70.0, 40.0);
        document.set_node(
            4,
            RenderedNode {
                bounds: node_box,
                view_wrapper: None,
            },
        );
        let selection = Selection::node(4, 1);

        assert_eq!(rect_for_range(&document, &selection, selection.bounds()), node_box);
    }

    #[test]
    fn node_view_wrapper_uses_its_first_child() {
        let document = document();
        let child = AnchorRect::new(12.0, 14.0, 64.0, 32.0);
        document.set_node(
            4,
            RenderedNode {
                bounds: AnchorRect::new(0.0, 0.0, 0.0, 0.0),
                view_wrapper: Some(NodeViewWrapper {
                    first_child: Some(child),
                }),
            },
        );
        let selection = Selection::node(4, 1);

        assert_eq!(rect_for_range(&document, &selection, selection.bounds()), child);
    }

    #[test]
    fn missing_node_or_empty_wrapper_falls_back_to_range() {
        let document = document();
        let selection = Selection::node(4, 1);
        let expected = AnchorRect::new(140.0, 50.0, 10.0, 20.0);

        assert_eq!(rect_for_range(&document, &selection, selection.bounds()), expected);

        document.set_node(
            4,
            RenderedNode {
                bounds: AnchorRect::new(1.0, 1.0, 1.0, 1.0),
                view_wrapper: Some(NodeViewWrapper { first_child: None }),
            },
        );
        assert_eq!(rect_for_range(&document, &selection, selection.bounds()), expected);
    }

    #[test]
    fn override_wins_and_is_scale_corrected() {
        let document = document();
        let selection = Selection::cursor(2);
        let fixed: AnchorOverride<MemoryDocument> =
            Box::new(|_: &MemoryDocument, _: SelectionRange| {
                AnchorRect::new(200.0, 100.0, 20.0, 10.0)
            });

        let rect = anchor_rect(
            &document,
            &selection,
            selection.bounds(),
            Some(&fixed),
            ScaleFactor::new(2.0, 2.0),
        );

        assert_eq!(rect, AnchorRect::new(100.0, 50.0, 10.0, 5.0));
    }

    #[test]
    fn default_rect_is_scale_corrected() {
        let document = document();
        let selection = Selection::cursor(0);

        let rect = anchor_rect(
            &document,
            &selection,
            selection.bounds(),
            None,
            ScaleFactor::new(0.5, 2.0),
        );

        assert_eq!(rect, AnchorRect::new(200.0, 25.0, 0.0, 10.0));
    }
}
