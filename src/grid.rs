// 3x3 grid overlay drawn over the map. Same layout as the canvas
// (R×R, row 0 at the bottom); untouched pixels are fully transparent.

use crate::types::Color;

pub struct GridOverlay {
    pixels: Vec<Color>,
}

impl GridOverlay {
    /// Two vertical and two horizontal lines at R/3 and 2R/3,
    /// each `2 * line_width + 1` pixels thick.
    pub fn new(resolution: u32, line_width: u32, color: Color) -> Self {
        let r = resolution as usize;
        let mut pixels = vec![Color::TRANSPARENT; r * r];
        let cell = resolution as i64 / 3;
        let half = line_width as i64;

        for line in 1..=2 {
            let center = line * cell;
            for offset in -half..=half {
                let pos = center + offset;
                if pos < 0 || pos >= resolution as i64 {
                    continue;
                }
                let pos = pos as usize;
                for i in 0..r {
                    pixels[i * r + pos] = color; // vertical line
                    pixels[pos * r + i] = color; // horizontal line
                }
            }
        }
        Self { pixels }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_at_thirds() {
        let color = Color::rgba(51, 38, 26, 204);
        let grid = GridOverlay::new(90, 1, color);
        let at = |x: usize, y: usize| grid.pixels()[y * 90 + x];
        for pos in [29, 30, 31, 59, 60, 61] {
            assert_eq!(at(pos, 5), color);
            assert_eq!(at(5, pos), color);
        }
        assert_eq!(at(28, 5), Color::TRANSPARENT);
        assert_eq!(at(45, 45), Color::TRANSPARENT);
        assert_eq!(at(62, 10), Color::TRANSPARENT);
    }

    #[test]
    fn test_wide_lines_clip_to_canvas() {
        let grid = GridOverlay::new(6, 10, Color::RED);
        assert!(grid.pixels().iter().all(|c| *c == Color::RED));
    }
}
