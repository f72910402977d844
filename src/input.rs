// Per-tick samples handed to the map by the host: one for the input devices,
// one for the tracked agent. The map never talks to an input backend directly.

/// Input state for one tick. Booleans named `toggle_*`, `clear` and
/// `color_key` are press edges (true only on the tick the key went down);
/// `draw_held` / `erase_held` are held-button state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSample {
    /// Window size in screen pixels.
    pub viewport: (f32, f32),
    /// Pointer in screen pixels (y down), if the backend has one.
    pub pointer: Option<(f32, f32)>,
    pub draw_held: bool,
    pub erase_held: bool,
    /// Scroll wheel movement this tick; only the sign is used.
    pub scroll: f32,
    pub toggle_map: bool,
    pub toggle_minimap: bool,
    pub toggle_hud: bool,
    pub toggle_grid: bool,
    pub clear: bool,
    /// Palette slot whose key was pressed (key `1` is slot 0).
    pub color_key: Option<usize>,
}

/// Tracked agent position and heading.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldSample {
    pub position: [f32; 3],
    /// Rotation about the vertical axis, degrees; 0 faces +z.
    pub yaw_degrees: f32,
}

impl WorldSample {
    /// Ground-plane pair (x, z) used for the map.
    pub fn ground(&self) -> (f32, f32) {
        (self.position[0], self.position[2])
    }
}
