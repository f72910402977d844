// Where the map widget lands on screen for each layout.
// Fullscreen: largest square inside the 5%..95% x 8%..92% band of the window.
// Minimap: square in the bottom-right corner, pulled in by the margin.

use crate::types::ScreenRect;
use crate::view::WidgetLayout;

/// Fullscreen anchors as fractions of the viewport (x_min, y_min, x_max, y_max).
const FULLSCREEN_ANCHORS: (f32, f32, f32, f32) = (0.05, 0.08, 0.95, 0.92);

/// Frame drawn around the map widget.
pub const BORDER_WIDTH: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapGeometry {
    /// Fraction of the viewport the minimap box takes in each axis.
    pub size: f32,
    /// Pixels between the box and the right/bottom edges.
    pub margin: f32,
}

/// Widget rect for `layout` in a `width × height` viewport; `None` when inactive.
pub fn widget_rect(layout: WidgetLayout, width: f32, height: f32, minimap: MinimapGeometry) -> Option<ScreenRect> {
    match layout {
        WidgetLayout::Inactive => None,
        WidgetLayout::Centered => {
            let (x0, y0, x1, y1) = FULLSCREEN_ANCHORS;
            let parent = ScreenRect::new(width * x0, height * y0, width * (x1 - x0), height * (y1 - y0));
            Some(parent.fit_square())
        }
        WidgetLayout::Corner => {
            let w = width * minimap.size;
            let h = height * minimap.size;
            let parent = ScreenRect::new(width - w - minimap.margin, height - h - minimap.margin, w, h);
            Some(parent.fit_square())
        }
    }
}
