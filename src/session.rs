//! The map as a whole: canvas, brush, view state and store, driven one tick
//! at a time.
//!
//! Each [`MapSession::tick`] consumes one [`InputSample`] (and optionally a
//! [`WorldSample`]) and reports what the host has to do this frame: re-upload
//! the canvas texture, move the marker, apply new [`ModeEffects`].

use tracing::{debug, error, info, warn};

use crate::brush::BrushController;
use crate::canvas::RasterCanvas;
use crate::config::MapConfig;
use crate::coords::{self, WorldBounds};
use crate::error::Result;
use crate::grid::GridOverlay;
use crate::input::{InputSample, WorldSample};
use crate::layout;
use crate::persist::{CanvasStore, LoadOutcome};
use crate::types::{PixelPos, ScreenRect};
use crate::view::{ModeEffects, Transition, ViewState};

/// Marker placement for one tick. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerTransform {
    /// Position in canvas pixel space (0..R, y up).
    pub pixel: (f32, f32),
    pub normalized: (f32, f32),
    /// Degrees, counter-clockwise on screen.
    pub rotation: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickOutput {
    /// Canvas pixels changed; the texture needs re-uploading.
    pub upload: bool,
    pub marker: Option<MarkerTransform>,
    /// Set only on ticks where the view changed.
    pub effects: Option<ModeEffects>,
    /// Screen rect of the map widget, if it is on screen.
    pub widget: Option<ScreenRect>,
}

pub struct MapSession<S: CanvasStore> {
    config: MapConfig,
    canvas: RasterCanvas,
    brush: BrushController,
    view: ViewState,
    grid: GridOverlay,
    bounds: WorldBounds,
    stroke: Option<PixelPos>,
    store: S,
}

impl<S: CanvasStore> MapSession<S> {
    /// Validate `config`, build the canvas and restore the last saved map.
    /// A missing or unreadable save leaves the background-filled canvas.
    pub fn open(config: MapConfig, mut store: S) -> Result<Self> {
        config.validate()?;
        let bounds = config.world_bounds()?;
        let mut canvas = RasterCanvas::new(config.resolution, config.background)?;

        match store.load(config.resolution) {
            Ok(LoadOutcome::Loaded(pixels)) => match canvas.replace_pixels(pixels) {
                Ok(()) => info!("saved map restored"),
                Err(e) => warn!(error = %e, "saved map ignored"),
            },
            Ok(LoadOutcome::NoPriorSave) => info!("no saved map, starting blank"),
            Err(e) => warn!(error = %e, "saved map unreadable, starting blank"),
        }

        let brush = BrushController::new(
            config.palette.clone(),
            config.brush_size,
            config.brush_min,
            config.brush_max,
        );
        let view = ViewState::new(config.initial_mode, config.show_grid);
        let grid = GridOverlay::new(config.resolution, config.grid_line_width, config.grid_color);

        Ok(Self { config, canvas, brush, view, grid, bounds, stroke: None, store })
    }

    pub fn canvas(&self) -> &RasterCanvas {
        &self.canvas
    }

    pub fn brush(&self) -> &BrushController {
        &self.brush
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn grid(&self) -> &GridOverlay {
        &self.grid
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Effects for the current state, for the host to apply at startup.
    pub fn effects(&self) -> ModeEffects {
        self.view.effects()
    }

    /// Re-target the marker projection, e.g. to a newly loaded terrain.
    pub fn set_world_bounds(&mut self, bounds: WorldBounds) {
        self.bounds = bounds;
    }

    pub fn clear_map(&mut self) {
        self.canvas.clear(self.config.background);
    }

    pub fn tick(&mut self, input: &InputSample, world: Option<&WorldSample>) -> TickOutput {
        let mut changed = false;
        if input.toggle_map {
            let steps = self.view.toggle_map();
            changed |= self.apply(&steps);
        }
        if input.toggle_minimap {
            let steps = self.view.toggle_minimap();
            changed |= self.apply(&steps);
        }
        if input.toggle_hud {
            let steps = self.view.toggle_hud();
            self.apply(&steps);
            changed = true;
        }
        if input.toggle_grid && self.view.hud_visible() {
            self.view.toggle_grid();
            changed = true;
        }

        let effects = self.view.effects();
        let (vw, vh) = input.viewport;
        let widget = layout::widget_rect(effects.layout, vw, vh, self.config.minimap());

        if self.view.is_drawing_eligible() {
            self.handle_drawing(input, widget.as_ref());
            self.handle_brush(input);
        } else {
            self.stroke = None;
        }

        let marker = match world {
            Some(w) if self.config.show_marker && self.view.is_map_visible() => self.marker_for(w),
            _ => None,
        };

        TickOutput {
            upload: self.canvas.take_dirty_and_reset(),
            marker,
            effects: changed.then_some(effects),
            widget,
        }
    }

    /// Save no matter which mode is active, then wait for the write.
    pub fn shutdown(&mut self) -> Result<()> {
        self.store.save(&self.canvas)?;
        self.store.flush()?;
        info!("map saved on shutdown");
        Ok(())
    }

    fn apply(&mut self, steps: &[Transition]) -> bool {
        for step in steps {
            info!(from = ?step.from, to = ?step.to, "map view changed");
            if step.enters_fullscreen() {
                self.stroke = None;
            }
            if step.exits_fullscreen() {
                self.save();
            }
        }
        !steps.is_empty()
    }

    fn save(&mut self) {
        if let Err(e) = self.store.save(&self.canvas) {
            error!(error = %e, "map save failed");
        }
    }

    fn handle_drawing(&mut self, input: &InputSample, widget: Option<&ScreenRect>) {
        if !input.draw_held && !input.erase_held {
            self.stroke = None;
            return;
        }
        let target = match (widget, input.pointer) {
            (Some(rect), Some(pointer)) => coords::screen_to_normalized(pointer, rect),
            _ => None,
        };
        let Some((nx, ny)) = target else {
            self.stroke = None;
            return;
        };

        let pos = coords::normalized_to_pixel(nx, ny, self.canvas.resolution());
        let color = if input.erase_held { self.config.background } else { self.brush.color() };
        let radius = self.brush.size();
        match self.stroke {
            Some(last) => self.canvas.draw_stroke(last, pos, color, radius),
            None => self.canvas.stamp(pos.x, pos.y, color, radius),
        }
        self.stroke = Some(pos);
    }

    fn handle_brush(&mut self, input: &InputSample) {
        if input.clear {
            self.clear_map();
        }
        if let Some(slot) = input.color_key {
            self.brush.select_color(slot);
        }
        if input.scroll != 0.0 {
            self.brush.adjust_size(input.scroll);
        }
    }

    fn marker_for(&self, world: &WorldSample) -> Option<MarkerTransform> {
        match coords::world_to_normalized(world.ground(), &self.bounds) {
            Ok((nx, ny)) => {
                let r = self.canvas.resolution() as f32;
                Some(MarkerTransform {
                    pixel: (nx * r, ny * r),
                    normalized: (nx, ny),
                    rotation: coords::heading_to_rotation(world.yaw_degrees),
                })
            }
            Err(e) => {
                debug!(error = %e, "marker skipped");
                None
            }
        }
    }
}
