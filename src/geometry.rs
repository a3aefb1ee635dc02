//! Screen-space primitives shared by the anchor calculator and popover backends.

/// Edges of a single caret position or rendered box, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coords {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Coords {
    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Rectangle the popover tip points at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorRect {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AnchorRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    /// Box spanning two caret positions, whichever order they come in.
    pub fn spanning(start: Coords, end: Coords) -> Self {
        let top = start.top.min(end.top);
        let bottom = start.bottom.max(end.bottom);
        let left = start.left.min(end.left);
        let right = start.right.max(end.right);
        Self::new(left, top, right - left, bottom - top)
    }

    /// Maps a rect measured in a scaled layer back into that layer's own frame.
    pub fn unscaled(self, scale: ScaleFactor) -> Self {
        let scale = scale.sanitized();
        Self::new(
            self.left / scale.x,
            self.top / scale.y,
            self.width / scale.x,
            self.height / scale.y,
        )
    }

    /// Inverse of [`AnchorRect::unscaled`].
    pub fn scaled(self, scale: ScaleFactor) -> Self {
        let scale = scale.sanitized();
        Self::new(
            self.left * scale.x,
            self.top * scale.y,
            self.width * scale.x,
            self.height * scale.y,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub x: f64,
    pub y: f64,
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ScaleFactor {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Ratio between an element's rendered box and its untransformed layout size.
    pub fn from_boxes(
        rendered_width: f64,
        rendered_height: f64,
        layout_width: f64,
        layout_height: f64,
    ) -> Self {
        Self {
            x: axis_ratio(rendered_width, layout_width),
            y: axis_ratio(rendered_height, layout_height),
        }
        .sanitized()
    }

    fn sanitized(self) -> Self {
        Self {
            x: sanitize_axis(self.x),
            y: sanitize_axis(self.y),
        }
    }
}

fn axis_ratio(rendered: f64, layout: f64) -> f64 {
    if layout > 0.0 && rendered > 0.0 {
        rendered / layout
    } else {
        1.0
    }
}

// Collapsed or hidden containers report zero sizes; dividing by them is meaningless.
fn sanitize_axis(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(left: AnchorRect, right: AnchorRect) {
        let pairs = [
            (left.top, right.top),
            (left.left, right.left),
            (left.right, right.right),
            (left.bottom, right.bottom),
            (left.width, right.width),
            (left.height, right.height),
        ];
        for (a, b) in pairs {
            assert!((a - b).abs() < 1e-9, "{left:?} != {right:?}");
        }
    }

    #[test]
    fn spanning_orders_edges_regardless_of_argument_order() {
        let start = Coords::new(40.0, 41.0, 30.0, 48.0);
        let end = Coords::new(10.0, 11.0, 10.0, 28.0);

        let rect = AnchorRect::spanning(start, end);

        assert_eq!(rect, AnchorRect::new(10.0, 10.0, 31.0, 38.0));
        assert_eq!(rect.right, 41.0);
        assert_eq!(rect.bottom, 48.0);
    }

    #[test]
    fn unscaled_divides_position_and_size_and_recomputes_edges() {
        let rect = AnchorRect::new(200.0, 100.0, 50.0, 20.0);

        let corrected = rect.unscaled(ScaleFactor::new(2.0, 0.5));

        assert_eq!(corrected.left, 100.0);
        assert_eq!(corrected.width, 25.0);
        assert_eq!(corrected.top, 200.0);
        assert_eq!(corrected.height, 40.0);
        assert_eq!(corrected.right, 125.0);
        assert_eq!(corrected.bottom, 240.0);
    }

    #[test]
    fn scale_correction_reverses_within_tolerance() {
        let rect = AnchorRect::new(13.7, 91.3, 7.25, 18.0);
        for scale in [
            ScaleFactor::new(1.25, 1.25),
            ScaleFactor::new(0.8, 1.5),
            ScaleFactor::new(3.0, 0.333),
        ] {
            assert_close(rect.unscaled(scale).scaled(scale), rect);
        }
    }

    #[test]
    fn degenerate_scale_is_treated_as_identity() {
        let rect = AnchorRect::new(10.0, 20.0, 30.0, 40.0);

        assert_eq!(rect.unscaled(ScaleFactor::new(0.0, f64::NAN)), rect);
        assert_eq!(
            ScaleFactor::from_boxes(0.0, 10.0, 100.0, 0.0),
            ScaleFactor::IDENTITY
        );
    }

    #[test]
    fn from_boxes_compares_rendered_to_layout_size() {
        let scale = ScaleFactor::from_boxes(150.0, 50.0, 100.0, 100.0);
        assert_eq!(scale, ScaleFactor::new(1.5, 0.5));
    }
}
