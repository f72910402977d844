//! Display-mode state machine.
//!
//! Exactly one [`DisplayMode`] is active. Each toggle returns the list of
//! [`Transition`]s it performed, in order, so the caller can run exit/entry
//! side effects once per transition (save on leaving fullscreen, drop the
//! stroke cursor on entering it). Widget, pointer and clock side effects are
//! described by [`ModeEffects`], derived from the current state.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Hidden,
    Minimap,
    Fullscreen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: DisplayMode,
    pub to: DisplayMode,
}

impl Transition {
    pub fn exits_fullscreen(&self) -> bool {
        self.from == DisplayMode::Fullscreen && self.to != DisplayMode::Fullscreen
    }

    pub fn enters_fullscreen(&self) -> bool {
        self.to == DisplayMode::Fullscreen && self.from != DisplayMode::Fullscreen
    }
}

/// Where the map widget sits on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetLayout {
    Inactive,
    Corner,
    Centered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerCapture {
    Locked,
    Free,
}

/// Everything the host has to apply when the view changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeEffects {
    pub layout: WidgetLayout,
    /// Dimmed backdrop, help text and color palette.
    pub chrome: bool,
    pub grid: bool,
    pub pointer: PointerCapture,
    pub time_scale: f32,
}

impl ModeEffects {
    const HIDDEN: ModeEffects = ModeEffects {
        layout: WidgetLayout::Inactive,
        chrome: false,
        grid: false,
        pointer: PointerCapture::Locked,
        time_scale: 1.0,
    };
}

#[derive(Clone, Debug)]
pub struct ViewState {
    mode: DisplayMode,
    hud_visible: bool,
    grid_visible: bool,
}

impl ViewState {
    pub fn new(initial: DisplayMode, grid_visible: bool) -> Self {
        Self { mode: initial, hud_visible: true, grid_visible }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// Drawing and brush input are only honored in visible fullscreen.
    pub fn is_drawing_eligible(&self) -> bool {
        self.hud_visible && self.mode == DisplayMode::Fullscreen
    }

    /// The map widget is on screen (marker needs updating).
    pub fn is_map_visible(&self) -> bool {
        self.hud_visible && self.mode != DisplayMode::Hidden
    }

    fn go(&mut self, to: DisplayMode, out: &mut Vec<Transition>) {
        if self.mode != to {
            out.push(Transition { from: self.mode, to });
            self.mode = to;
        }
    }

    /// Map key: open fullscreen, or fall back to the minimap from fullscreen.
    pub fn toggle_map(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.hud_visible {
            return out;
        }
        let to = match self.mode {
            DisplayMode::Fullscreen => DisplayMode::Minimap,
            DisplayMode::Hidden | DisplayMode::Minimap => DisplayMode::Fullscreen,
        };
        self.go(to, &mut out);
        out
    }

    /// Minimap key: `Minimap ↔ Hidden`. From fullscreen the map is closed
    /// first, then the toggle applies to the closed state.
    pub fn toggle_minimap(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.hud_visible {
            return out;
        }
        if self.mode == DisplayMode::Fullscreen {
            self.go(DisplayMode::Hidden, &mut out);
        }
        let to = match self.mode {
            DisplayMode::Minimap => DisplayMode::Hidden,
            _ => DisplayMode::Minimap,
        };
        self.go(to, &mut out);
        out
    }

    /// HUD key: hide/show every overlay. Fullscreen is never left paused
    /// behind a hidden HUD; it drops back to the minimap first.
    pub fn toggle_hud(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if self.mode == DisplayMode::Fullscreen {
            self.go(DisplayMode::Minimap, &mut out);
        }
        self.hud_visible = !self.hud_visible;
        out
    }

    pub fn toggle_grid(&mut self) {
        self.grid_visible = !self.grid_visible;
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
    }

    pub fn effects(&self) -> ModeEffects {
        if !self.hud_visible {
            return ModeEffects::HIDDEN;
        }
        match self.mode {
            DisplayMode::Hidden => ModeEffects::HIDDEN,
            DisplayMode::Minimap => ModeEffects {
                layout: WidgetLayout::Corner,
                grid: self.grid_visible,
                ..ModeEffects::HIDDEN
            },
            DisplayMode::Fullscreen => ModeEffects {
                layout: WidgetLayout::Centered,
                chrome: true,
                grid: self.grid_visible,
                pointer: PointerCapture::Free,
                time_scale: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::DisplayMode::*;

    fn t(from: DisplayMode, to: DisplayMode) -> Transition {
        Transition { from, to }
    }

    #[test]
    fn test_toggle_map_cycle() {
        let mut v = ViewState::new(Minimap, true);
        let open = v.toggle_map();
        assert_eq!(open, vec![t(Minimap, Fullscreen)]);
        assert!(open[0].enters_fullscreen() && !open[0].exits_fullscreen());
        assert_eq!(v.toggle_map(), vec![t(Fullscreen, Minimap)]);

        let mut v = ViewState::new(Hidden, true);
        assert_eq!(v.toggle_map(), vec![t(Hidden, Fullscreen)]);
        assert_eq!(v.mode(), Fullscreen);
    }

    #[test]
    fn test_toggle_minimap_from_fullscreen_passes_through_hidden() {
        let mut v = ViewState::new(Fullscreen, true);
        let steps = v.toggle_minimap();
        assert_eq!(steps, vec![t(Fullscreen, Hidden), t(Hidden, Minimap)]);
        assert_eq!(steps.iter().filter(|s| s.exits_fullscreen()).count(), 1);
        assert_eq!(v.mode(), Minimap);
    }

    #[test]
    fn test_toggle_minimap_hidden_round_trip() {
        let mut v = ViewState::new(Minimap, true);
        assert_eq!(v.toggle_minimap(), vec![t(Minimap, Hidden)]);
        assert_eq!(v.toggle_minimap(), vec![t(Hidden, Minimap)]);
    }

    #[test]
    fn test_hud_toggle_forces_minimap() {
        let mut v = ViewState::new(Fullscreen, true);
        assert_eq!(v.toggle_hud(), vec![t(Fullscreen, Minimap)]);
        assert!(!v.hud_visible());
        assert_eq!(v.effects(), ModeEffects::HIDDEN);
        // Map toggles are ignored while the HUD is hidden.
        assert!(v.toggle_map().is_empty());
        assert!(v.toggle_minimap().is_empty());
        assert!(v.toggle_hud().is_empty());
        assert_eq!(v.mode(), Minimap);
        assert!(v.is_map_visible());
    }

    #[test]
    fn test_effects_per_mode() {
        let mut v = ViewState::new(Fullscreen, true);
        let full = v.effects();
        assert_eq!(full.layout, WidgetLayout::Centered);
        assert_eq!(full.pointer, PointerCapture::Free);
        assert_eq!(full.time_scale, 0.0);
        assert!(full.chrome);

        v.toggle_map();
        let mini = v.effects();
        assert_eq!(mini.layout, WidgetLayout::Corner);
        assert_eq!(mini.pointer, PointerCapture::Locked);
        assert_eq!(mini.time_scale, 1.0);
        assert!(!mini.chrome);
        assert!(mini.grid);

        v.toggle_minimap();
        assert_eq!(v.effects().layout, WidgetLayout::Inactive);
    }

    #[test]
    fn test_transition_sequences_stay_consistent() {
        // Every step chains from the previous mode and ends on the current one.
        let ops: [fn(&mut ViewState) -> Vec<Transition>; 3] =
            [ViewState::toggle_map, ViewState::toggle_minimap, ViewState::toggle_hud];
        let mut v = ViewState::new(Minimap, false);
        let mut seed = 7u32;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let before = v.mode();
            let steps = ops[(seed >> 16) as usize % 3](&mut v);
            let mut cur = before;
            for s in &steps {
                assert_eq!(s.from, cur);
                assert_ne!(s.from, s.to);
                cur = s.to;
            }
            assert_eq!(cur, v.mode());
            assert!(steps.iter().filter(|s| s.exits_fullscreen()).count() <= 1);
        }
    }

    #[test]
    fn test_grid_toggle() {
        let mut v = ViewState::new(Minimap, true);
        v.toggle_grid();
        assert!(!v.effects().grid);
        v.set_grid_visible(true);
        assert!(v.grid_visible());
    }
}
