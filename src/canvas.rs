// The paintable map: a square RGBA pixel buffer plus the two raster algorithms
// that write into it (disk stamp and Bresenham stroke).
// Row 0 is the bottom row of the map, so index = y * R + x.

use crate::error::{Error, Result};
use crate::types::{Color, PixelPos};

pub struct RasterCanvas {
    resolution: u32,
    pixels: Vec<Color>, // length = R * R, always
    dirty: bool,
}

impl RasterCanvas {
    /// Allocate an `R×R` canvas filled with `background`.
    pub fn new(resolution: u32, background: Color) -> Result<Self> {
        if resolution == 0 {
            return Err(Error::InvalidResolution(resolution));
        }
        let len = resolution as usize * resolution as usize;
        Ok(Self { resolution, pixels: vec![background; len], dirty: true })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Row-major pixels, bottom row first.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let r = self.resolution as i32;
        x >= 0 && y >= 0 && x < r && y < r
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.resolution as usize + x as usize
    }

    /// Paint a filled disk of `radius` centered at (cx, cy).
    /// The scan is clipped to the canvas, so any radius is safe.
    pub fn stamp(&mut self, cx: i32, cy: i32, color: Color, radius: u32) {
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(radius));
        let last = i64::from(self.resolution) - 1;
        let r2 = i128::from(r) * i128::from(r);
        let (x0, x1) = ((cx - r).max(0), (cx + r).min(last));
        let (y0, y1) = ((cy - r).max(0), (cy + r).min(last));
        for y in y0..=y1 {
            let dy = i128::from(y - cy);
            let row = y as usize * self.resolution as usize;
            for x in x0..=x1 {
                let dx = i128::from(x - cx);
                if dx * dx + dy * dy <= r2 {
                    self.pixels[row + x as usize] = color;
                }
            }
        }
        self.dirty = true;
    }

    /// Stamp along the Bresenham line from `from` to `to`, endpoints included.
    pub fn draw_stroke(&mut self, from: PixelPos, to: PixelPos, color: Color, radius: u32) {
        for p in line_points(from, to) {
            self.stamp(p.x, p.y, color, radius);
        }
    }

    /// Reset every pixel to `background`.
    pub fn clear(&mut self, background: Color) {
        self.pixels.fill(background);
        self.dirty = true;
    }

    /// True if pixels changed since the last call. Clears the flag.
    pub fn take_dirty_and_reset(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn sample(&self, x: i32, y: i32) -> Result<Color> {
        if !self.in_bounds(x, y) {
            return Err(Error::OutOfBounds { x, y, resolution: self.resolution });
        }
        Ok(self.pixels[self.index(x, y)])
    }

    /// Swap in a whole buffer (e.g. from a saved map). Length must be `R*R`.
    pub fn replace_pixels(&mut self, pixels: Vec<Color>) -> Result<()> {
        if pixels.len() != self.pixels.len() {
            return Err(Error::BufferLength { expected: self.pixels.len(), found: pixels.len() });
        }
        self.pixels = pixels;
        self.dirty = true;
        Ok(())
    }
}

/// Integer Bresenham stepping between two points, both endpoints included.
/// Endpoints are put in a canonical order first so A→B and B→A step through
/// the same pixels.
pub fn line_points(a: PixelPos, b: PixelPos) -> Vec<PixelPos> {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let (mut x0, mut y0) = (start.x, start.y);
    let (x1, y1) = (end.x, end.y);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut out = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        out.push(PixelPos::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    out
}
