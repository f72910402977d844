// Pure coordinate transforms between the four spaces the map deals with:
//   screen     host window pixels, y grows downward
//   normalized [0,1]², origin bottom-left of the canvas
//   pixel      integer canvas pixel, row 0 at the bottom
//   world      ground plane (x, z) of the tracked agent

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{PixelPos, ScreenRect};

/// Rectangle of world ground-plane coordinates mapped onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl WorldBounds {
    /// Fails when either axis has zero or negative extent.
    pub fn new(min: [f32; 2], max: [f32; 2]) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Bounds from an origin corner and a size, e.g. a terrain's position and extent.
    pub fn from_extent(origin: [f32; 2], size: [f32; 2]) -> Result<Self> {
        Self::new(origin, [origin[0] + size[0], origin[1] + size[1]])
    }

    pub fn validate(&self) -> Result<()> {
        let w = self.max[0] - self.min[0];
        let h = self.max[1] - self.min[1];
        // Written so NaN extents fail too.
        if !(w > 0.0 && h > 0.0) {
            return Err(Error::DegenerateWorldBounds { min: self.min, max: self.max });
        }
        Ok(())
    }
}

/// Project a screen-space pointer into the widget and normalize to `[0,1]²`.
/// `None` when the pointer is outside the widget.
pub fn screen_to_normalized(pointer: (f32, f32), rect: &ScreenRect) -> Option<(f32, f32)> {
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return None;
    }
    let nx = (pointer.0 - rect.x) / rect.w;
    let ny = 1.0 - (pointer.1 - rect.y) / rect.h;
    let inside = (0.0..=1.0).contains(&nx) && (0.0..=1.0).contains(&ny);
    inside.then_some((nx, ny))
}

/// `floor(n * R)` per axis. `n == 1.0` lands on the last pixel.
pub fn normalized_to_pixel(nx: f32, ny: f32, resolution: u32) -> PixelPos {
    let last = resolution.saturating_sub(1) as i32;
    let px = ((nx * resolution as f32).floor() as i32).clamp(0, last);
    let py = ((ny * resolution as f32).floor() as i32).clamp(0, last);
    PixelPos::new(px, py)
}

/// Map a world ground-plane position into `[0,1]²`, clamped so the marker
/// stays on the edge when the agent leaves the mapped region. A non-finite
/// position is an error.
pub fn world_to_normalized(world: (f32, f32), bounds: &WorldBounds) -> Result<(f32, f32)> {
    bounds.validate()?;
    if !(world.0.is_finite() && world.1.is_finite()) {
        return Err(Error::NonFiniteWorldPosition { x: world.0, z: world.1 });
    }
    let w = bounds.max[0] - bounds.min[0];
    let h = bounds.max[1] - bounds.min[1];
    let nx = ((world.0 - bounds.min[0]) / w).clamp(0.0, 1.0);
    let ny = ((world.1 - bounds.min[1]) / h).clamp(0.0, 1.0);
    Ok((nx, ny))
}

/// Marker rotation (degrees, counter-clockwise on screen) for a world yaw.
pub fn heading_to_rotation(yaw_degrees: f32) -> f32 {
    -yaw_degrees
}

/// Inverse of [`screen_to_normalized`]: where a normalized point sits on screen.
pub fn normalized_to_screen(n: (f32, f32), rect: &ScreenRect) -> (f32, f32) {
    (rect.x + n.0 * rect.w, rect.y + (1.0 - n.1) * rect.h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds::new([-250.0, -250.0], [250.0, 250.0]).unwrap()
    }

    #[test]
    fn test_screen_to_normalized_flips_y() {
        let rect = ScreenRect::new(100.0, 50.0, 200.0, 200.0);
        assert_eq!(screen_to_normalized((100.0, 250.0), &rect), Some((0.0, 0.0)));
        assert_eq!(screen_to_normalized((300.0, 50.0), &rect), Some((1.0, 1.0)));
        assert_eq!(screen_to_normalized((200.0, 100.0), &rect), Some((0.5, 0.75)));
    }

    #[test]
    fn test_screen_outside_widget_is_none() {
        let rect = ScreenRect::new(100.0, 50.0, 200.0, 200.0);
        assert_eq!(screen_to_normalized((99.0, 100.0), &rect), None);
        assert_eq!(screen_to_normalized((150.0, 251.0), &rect), None);
        assert_eq!(screen_to_normalized((150.0, 100.0), &ScreenRect::new(0.0, 0.0, 0.0, 10.0)), None);
    }

    #[test]
    fn test_normalized_to_pixel() {
        assert_eq!(normalized_to_pixel(0.0, 0.0, 512), PixelPos::new(0, 0));
        assert_eq!(normalized_to_pixel(0.5, 0.25, 512), PixelPos::new(256, 128));
        assert_eq!(normalized_to_pixel(1.0, 1.0, 512), PixelPos::new(511, 511));
    }

    #[test]
    fn test_world_to_normalized_center_and_corner() {
        let b = bounds();
        assert_eq!(world_to_normalized((0.0, 0.0), &b).unwrap(), (0.5, 0.5));
        assert_eq!(world_to_normalized((-250.0, 250.0), &b).unwrap(), (0.0, 1.0));
    }

    #[test]
    fn test_world_to_normalized_always_clamped() {
        let b = bounds();
        for x in [-1.0e7_f32, -900.0, -250.0, 13.0, 250.0, 4000.0, 1.0e9] {
            for z in [-1.0e9_f32, -251.0, 0.0, 251.0, 1.0e7] {
                let (nx, ny) = world_to_normalized((x, z), &b).unwrap();
                assert!((0.0..=1.0).contains(&nx), "x={x} -> {nx}");
                assert!((0.0..=1.0).contains(&ny), "z={z} -> {ny}");
            }
        }
        for bad in [(f32::NAN, 0.0), (0.0, f32::INFINITY), (f32::NEG_INFINITY, f32::NAN)] {
            assert!(matches!(
                world_to_normalized(bad, &b),
                Err(Error::NonFiniteWorldPosition { .. })
            ));
        }
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        assert!(WorldBounds::new([0.0, 0.0], [0.0, 10.0]).is_err());
        assert!(WorldBounds::new([5.0, 0.0], [1.0, 10.0]).is_err());
        let raw = WorldBounds { min: [0.0, 3.0], max: [10.0, 3.0] };
        assert!(matches!(
            world_to_normalized((1.0, 1.0), &raw),
            Err(Error::DegenerateWorldBounds { .. })
        ));
    }

    #[test]
    fn test_from_extent() {
        let b = WorldBounds::from_extent([100.0, -20.0], [400.0, 200.0]).unwrap();
        assert_eq!(b.max, [500.0, 180.0]);
        assert!(WorldBounds::from_extent([0.0, 0.0], [10.0, 0.0]).is_err());
    }

    #[test]
    fn test_heading_negated() {
        assert_eq!(heading_to_rotation(90.0), -90.0);
        assert_eq!(heading_to_rotation(-45.0), 45.0);
    }

    #[test]
    fn test_normalized_to_screen_inverts() {
        let rect = ScreenRect::new(10.0, 20.0, 100.0, 100.0);
        let p = normalized_to_screen((0.25, 0.75), &rect);
        assert_eq!(p, (35.0, 45.0));
        assert_eq!(screen_to_normalized(p, &rect), Some((0.25, 0.75)));
    }
}
