// Brush state: which palette color is selected and how big the disk is.
// Only discrete input edges change it (number keys, scroll clicks).

use crate::types::Color;

pub const DEFAULT_MIN_SIZE: u32 = 1;
pub const DEFAULT_MAX_SIZE: u32 = 20;

#[derive(Clone, Debug)]
pub struct BrushController {
    palette: Vec<Color>,
    index: usize,
    size: u32,
    min_size: u32,
    max_size: u32,
}

impl BrushController {
    /// `palette` must be non-empty and `min_size <= max_size` (checked by config validation).
    pub fn new(palette: Vec<Color>, size: u32, min_size: u32, max_size: u32) -> Self {
        Self { palette, index: 0, size: size.clamp(min_size, max_size), min_size, max_size }
    }

    pub fn color(&self) -> Color {
        self.palette[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// Select a palette slot. Slots past the end of the palette are ignored.
    pub fn select_color(&mut self, index: usize) {
        if index < self.palette.len() {
            self.index = index;
        }
    }

    /// One step per scroll event; only the sign of `delta` counts.
    pub fn adjust_size(&mut self, delta: f32) {
        if delta > 0.0 {
            self.size = (self.size + 1).min(self.max_size);
        } else if delta < 0.0 {
            self.size = self.size.saturating_sub(1).max(self.min_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush(size: u32) -> BrushController {
        BrushController::new(vec![Color::BLACK, Color::RED, Color::BLUE], size, 1, 20)
    }

    #[test]
    fn test_scroll_scenario() {
        let mut b = brush(1);
        for _ in 0..3 {
            b.adjust_size(1.0);
        }
        assert_eq!(b.size(), 4);
        for _ in 0..5 {
            b.adjust_size(-1.0);
        }
        assert_eq!(b.size(), 1);
    }

    #[test]
    fn test_only_sign_matters() {
        let mut b = brush(5);
        b.adjust_size(120.0);
        assert_eq!(b.size(), 6);
        b.adjust_size(-0.01);
        assert_eq!(b.size(), 5);
        b.adjust_size(0.0);
        b.adjust_size(f32::NAN);
        assert_eq!(b.size(), 5);
    }

    #[test]
    fn test_size_capped_at_max() {
        let mut b = brush(19);
        b.adjust_size(1.0);
        b.adjust_size(1.0);
        assert_eq!(b.size(), 20);
    }

    #[test]
    fn test_initial_size_clamped() {
        assert_eq!(brush(0).size(), 1);
        assert_eq!(brush(99).size(), 20);
    }

    #[test]
    fn test_select_color() {
        let mut b = brush(3);
        assert_eq!(b.color(), Color::BLACK);
        b.select_color(2);
        assert_eq!(b.color(), Color::BLUE);
        b.select_color(7);
        assert_eq!(b.index(), 2);
    }
}
