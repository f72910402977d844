// Window + software drawing for the host.
// What ends up on screen each frame:
// 1) A dark "world" backdrop with a status line.
// 2) The map texture inside its widget rect (corner minimap or centered sheet),
//    framed by a border, with the grid and the player marker on top.
// 3) In fullscreen: dimmed backdrop, color palette, help text, brush crosshair.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::blend::GammaLut;
use crate::canvas::{self, RasterCanvas};
use crate::coords;
use crate::error::Error;
use crate::grid::GridOverlay;
use crate::input::InputSample;
use crate::layout::BORDER_WIDTH;
use crate::session::MarkerTransform;
use crate::types::{Color, FrameBuffer, PixelPos, ScreenRect};
use crate::view::{ModeEffects, PointerCapture, WidgetLayout};

const WORLD_BG: u32 = 0x00_1E_24_2B;
const BORDER_COLOR: u32 = 0x00_4D_33_1A;
const MARKER_COLOR: u32 = 0x00_FF_00_00;
const MARKER_SIZE: i32 = 15;
const BACKDROP: Color = Color::rgba(0, 0, 0, 179);
const SWATCH: i32 = 40;
const SWATCH_GAP: i32 = 10;
const HELP: &str = "LMB: DRAW | RMB: ERASE | 1-9: COLORS | SCROLL: SIZE | C: CLEAR | G: GRID | R: MINIMAP | E: CLOSE";

const PALETTE_KEYS: [Key; 9] = [
    Key::Key1,
    Key::Key2,
    Key::Key3,
    Key::Key4,
    Key::Key5,
    Key::Key6,
    Key::Key7,
    Key::Key8,
    Key::Key9,
];

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    fn pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    fn down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    /// Poll devices into one sample for the map.
    pub fn sample_input(&self) -> InputSample {
        let (w, h) = self.window.get_size();
        InputSample {
            viewport: (w as f32, h as f32),
            pointer: self.window.get_mouse_pos(MouseMode::Discard),
            draw_held: self.window.get_mouse_down(MouseButton::Left),
            erase_held: self.window.get_mouse_down(MouseButton::Right),
            scroll: self.window.get_scroll_wheel().map_or(0.0, |(_, y)| y),
            toggle_map: self.pressed(Key::E),
            toggle_minimap: self.pressed(Key::R),
            toggle_hud: self.pressed(Key::H),
            toggle_grid: self.pressed(Key::G),
            clear: self.pressed(Key::C),
            color_key: PALETTE_KEYS.iter().position(|k| self.pressed(*k)),
        }
    }

    /// Walk controls as (forward, turn), each in -1..=1.
    pub fn walk_axes(&self) -> (f32, f32) {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        let forward = axis(self.down(Key::W) || self.down(Key::Up), self.down(Key::S) || self.down(Key::Down));
        let turn = axis(self.down(Key::D) || self.down(Key::Right), self.down(Key::A) || self.down(Key::Left));
        (forward, turn)
    }

    /// Pointer capture: the closest minifb gets is hiding the OS cursor.
    pub fn apply_effects(&mut self, effects: &ModeEffects) {
        self.window.set_cursor_visibility(effects.pointer == PointerCapture::Free);
    }
}

/// The map as the window sees it: canvas (plus grid) baked into 0x00RRGGBB.
/// Only rebuilt when the session reports an upload.
pub struct MapTexture {
    resolution: usize,
    pixels: Vec<u32>, // row 0 = bottom row, like the canvas
}

impl MapTexture {
    pub fn new(resolution: u32) -> Self {
        let r = resolution as usize;
        Self { resolution: r, pixels: vec![0; r * r] }
    }

    pub fn upload(&mut self, canvas: &RasterCanvas, grid: Option<&GridOverlay>, lut: &GammaLut) {
        for (dst, c) in self.pixels.iter_mut().zip(canvas.pixels()) {
            *dst = c.to_rgb_u32();
        }
        if let Some(grid) = grid {
            for (dst, g) in self.pixels.iter_mut().zip(grid.pixels()) {
                *dst = lut.blend_over(*dst, *g);
            }
        }
    }

    /// Nearest-neighbour lookup for normalized (u right, v down) coordinates.
    #[inline]
    fn texel(&self, u: f32, v: f32) -> u32 {
        let last = self.resolution - 1;
        let tx = ((u * self.resolution as f32) as usize).min(last);
        let row = ((v * self.resolution as f32) as usize).min(last);
        self.pixels[(last - row) * self.resolution + tx]
    }
}

/// Everything needed to draw one frame.
pub struct Scene<'a> {
    pub texture: &'a MapTexture,
    pub effects: ModeEffects,
    pub widget: Option<ScreenRect>,
    pub marker: Option<MarkerTransform>,
    pub palette: &'a [Color],
    pub selected: usize,
    pub brush_size: u32,
    pub pointer: Option<(f32, f32)>,
    pub status: &'a str,
}

pub fn compose(fb: &mut FrameBuffer, lut: &GammaLut, scene: &Scene<'_>) {
    fb.fill(WORLD_BG);
    draw_text_5x7(fb, 8, 8, scene.status, 0x00_FF_FF_FF);

    let Some(rect) = scene.widget else { return };
    if scene.effects.layout == WidgetLayout::Inactive {
        return;
    }

    if scene.effects.chrome {
        for px in &mut fb.pixels {
            *px = lut.blend_over(*px, BACKDROP);
        }
    }

    fill_rect(fb, &rect.inflate(BORDER_WIDTH), BORDER_COLOR);
    blit_map(fb, scene.texture, &rect);

    if let Some(marker) = scene.marker {
        let (mx, my) = coords::normalized_to_screen(marker.normalized, &rect);
        draw_marker(fb, mx as i32, my as i32, MARKER_SIZE, marker.rotation, MARKER_COLOR);
    }

    if scene.effects.chrome {
        draw_palette(fb, scene.palette, scene.selected);
        let help_x = (fb.width as i32 - text_width(HELP)) / 2;
        draw_text_5x7(fb, help_x, fb.height as i32 - 20, HELP, 0x00_FF_FF_FF);

        if let Some((px, py)) = scene.pointer {
            if coords::screen_to_normalized((px, py), &rect).is_some() {
                // Crosshair arm scales with the brush as it appears on screen.
                let texel = rect.w / scene.texture.resolution as f32;
                let arm = ((scene.brush_size as f32 * texel) as i32).max(4) + 2;
                draw_crosshair(fb, px as i32, py as i32, arm, 0x00_FF_CC_33);
            }
        }
    }
}

fn blit_map(fb: &mut FrameBuffer, texture: &MapTexture, rect: &ScreenRect) {
    let x0 = rect.x.max(0.0) as usize;
    let y0 = rect.y.max(0.0) as usize;
    let x1 = ((rect.x + rect.w).max(0.0) as usize).min(fb.width);
    let y1 = ((rect.y + rect.h).max(0.0) as usize).min(fb.height);
    for sy in y0..y1 {
        let v = (sy as f32 + 0.5 - rect.y) / rect.h;
        let row = sy * fb.width;
        for sx in x0..x1 {
            let u = (sx as f32 + 0.5 - rect.x) / rect.w;
            fb.pixels[row + sx] = texture.texel(u, v);
        }
    }
}

/* ---------- Software drawing: pixels, rects, marker, crosshair, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

fn fill_rect(fb: &mut FrameBuffer, rect: &ScreenRect, color: u32) {
    let (x0, y0) = (rect.x as i32, rect.y as i32);
    let (x1, y1) = ((rect.x + rect.w) as i32, (rect.y + rect.h) as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            put_pixel(fb, x, y, color);
        }
    }
}

fn outline_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    draw_line(fb, x, y, x + w - 1, y, color);
    draw_line(fb, x, y + h - 1, x + w - 1, y + h - 1, color);
    draw_line(fb, x, y, x, y + h - 1, color);
    draw_line(fb, x + w - 1, y, x + w - 1, y + h - 1, color);
}

/// Thin line between (x0,y0) and (x1,y1), stepped the same way as map strokes.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    for p in canvas::line_points(PixelPos::new(x0, y0), PixelPos::new(x1, y1)) {
        put_pixel(fb, p.x, p.y, color);
    }
}

/// Small crosshair centered at (cx,cy), with a gap in the middle.
fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// True if the marker-local point (nx, ny in -1..1, y up) is inside the
/// arrow-head triangle pointing along +y.
fn in_marker_triangle(nx: f32, ny: f32) -> bool {
    ny > -0.5 && ny < 0.8 && nx.abs() < (0.8 - ny) * 0.6
}

/// Filled triangle marker of `size` pixels, rotated `rotation` degrees
/// counter-clockwise; rotation 0 points up the screen.
fn draw_marker(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, rotation: f32, color: u32) {
    let half = size as f32 * 0.5;
    let (sin, cos) = rotation.to_radians().sin_cos();
    let reach = size; // rotated sprite stays inside the doubled box
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            // Screen offset -> y-up, then undo the rotation.
            let (x, y) = (dx as f32, -(dy as f32));
            let lx = x * cos + y * sin;
            let ly = -x * sin + y * cos;
            if in_marker_triangle(lx / half, ly / half) {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Row of numbered color swatches along the top edge; the active one is outlined.
fn draw_palette(fb: &mut FrameBuffer, palette: &[Color], selected: usize) {
    let n = palette.len() as i32;
    let total = n * SWATCH + (n - 1).max(0) * SWATCH_GAP;
    let mut x = (fb.width as i32 - total) / 2;
    let y = 10;
    for (i, color) in palette.iter().enumerate() {
        let rect = ScreenRect::new(x as f32, y as f32, SWATCH as f32, SWATCH as f32);
        fill_rect(fb, &rect, color.to_rgb_u32());
        if i == selected {
            outline_rect(fb, x - 3, y - 3, SWATCH + 6, SWATCH + 6, 0x00_FF_FF_FF);
        }
        let label = if *color == Color::BLACK { 0x00_FF_FF_FF } else { 0x00_00_00_00 };
        if let Some(digit) = char::from_digit(i as u32 + 1, 10) {
            draw_char_5x7(fb, x + SWATCH / 2 - 2, y + SWATCH / 2 - 3, digit, label);
        }
        x += SWATCH + SWATCH_GAP;
    }
}

/* ---------- 5x7 bitmap font (digits, A-Z, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Each u8 is a row; the low 5 bits are the
/// pixels (bit 4 = leftmost). Lowercase is drawn as uppercase.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00100,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (shift, ink) in [(1, 0x00000000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + shift, y + ry as i32 + shift, ink);
                }
            }
        }
    }
}

fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

/// Draw a text string using 5x7 glyphs (5 pixels + 1 spacing per char).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_points_along_rotation() {
        // Unrotated: the tip is above the center (screen y smaller).
        let mut fb = FrameBuffer::new(40, 40);
        draw_marker(&mut fb, 20, 20, 15, 0.0, 1);
        assert_eq!(fb.pixels[15 * 40 + 20], 1);
        assert_eq!(fb.pixels[26 * 40 + 20], 0);

        // -90 degrees (yaw 90) turns it to point right.
        let mut fb = FrameBuffer::new(40, 40);
        draw_marker(&mut fb, 20, 20, 15, -90.0, 1);
        assert_eq!(fb.pixels[20 * 40 + 25], 1);
        assert_eq!(fb.pixels[20 * 40 + 14], 0);
    }

    #[test]
    fn test_texture_bottom_row_drawn_at_bottom() {
        let mut canvas = RasterCanvas::new(4, Color::WHITE).unwrap();
        canvas.stamp(0, 0, Color::BLACK, 0);
        let mut tex = MapTexture::new(4);
        tex.upload(&canvas, None, &GammaLut::new());

        let mut fb = FrameBuffer::new(8, 8);
        blit_map(&mut fb, &tex, &ScreenRect::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(fb.pixels[7 * 8], 0x00_00_00_00);
        assert_eq!(fb.pixels[0], 0x00_FF_FF_FF);
    }

    #[test]
    fn test_crosshair_and_outline() {
        let mut fb = FrameBuffer::new(20, 20);
        draw_crosshair(&mut fb, 10, 10, 5, 9);
        for x in [5, 8, 10, 12, 15] {
            assert_eq!(fb.pixels[10 * 20 + x], 9, "x={x}");
        }
        assert_eq!(fb.pixels[10 * 20 + 9], 0);
        assert_eq!(fb.pixels[5 * 20 + 10], 9);

        let mut fb = FrameBuffer::new(6, 6);
        outline_rect(&mut fb, 1, 1, 4, 4, 3);
        assert_eq!(fb.pixels.iter().filter(|p| **p == 3).count(), 12);
        assert_eq!(fb.pixels[2 * 6 + 2], 0);
    }

    #[test]
    fn test_text_clips_at_edges() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_text_5x7(&mut fb, -3, 6, "MAP 12", 7);
        assert!(fb.pixels.iter().any(|p| *p == 7));
    }
}
