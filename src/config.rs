//! Map configuration.
//!
//! Stored as JSON at `~/.config/player-map/config.json` (or a path given on
//! the command line). Every field has a default, so a missing file or a
//! partial one both work. The loaded value is validated before use; invalid
//! values are fatal rather than silently replaced.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::brush::{DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE};
use crate::coords::WorldBounds;
use crate::error::{Error, Result};
use crate::layout::MinimapGeometry;
use crate::persist;
use crate::types::Color;
use crate::view::DisplayMode;

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("player-map")
        .join("config.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub resolution: u32,
    pub background: Color,
    pub palette: Vec<Color>,
    pub brush_size: u32,
    pub brush_min: u32,
    pub brush_max: u32,
    pub world_min: [f32; 2],
    pub world_max: [f32; 2],
    /// Fraction of the window the minimap takes, 0.1..=0.4.
    pub minimap_size: f32,
    /// Pixels from the window edge.
    pub minimap_margin: f32,
    pub initial_mode: DisplayMode,
    pub show_marker: bool,
    pub show_grid: bool,
    pub grid_color: Color,
    pub grid_line_width: u32,
    pub save_path: Option<PathBuf>,
    pub background_saves: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            background: Color::rgb(230, 217, 179),
            palette: vec![
                Color::BLACK,
                Color::RED,
                Color::BLUE,
                Color::rgb(0, 128, 0),
                Color::rgb(153, 77, 0),
            ],
            brush_size: 3,
            brush_min: DEFAULT_MIN_SIZE,
            brush_max: DEFAULT_MAX_SIZE,
            world_min: [-250.0, -250.0],
            world_max: [250.0, 250.0],
            minimap_size: 0.2,
            minimap_margin: 20.0,
            initial_mode: DisplayMode::Minimap,
            show_marker: true,
            show_grid: true,
            grid_color: Color::rgba(51, 38, 26, 204),
            grid_line_width: 4,
            save_path: None,
            background_saves: false,
        }
    }
}

impl MapConfig {
    /// Read and validate a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => {
                info!(path = %path.display(), "config loaded");
                serde_json::from_str(&contents)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(Error::io(path, e)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(Error::InvalidResolution(self.resolution));
        }
        self.world_bounds()?;
        if self.palette.is_empty() {
            return Err(Error::InvalidConfig("palette must hold at least one color".into()));
        }
        if self.brush_min == 0 || self.brush_min > self.brush_max {
            return Err(Error::InvalidConfig(format!(
                "brush size bounds [{}, {}] are invalid",
                self.brush_min, self.brush_max
            )));
        }
        if self.brush_max > self.resolution {
            return Err(Error::InvalidConfig(format!(
                "brush_max {} exceeds resolution {}",
                self.brush_max, self.resolution
            )));
        }
        if !(self.brush_min..=self.brush_max).contains(&self.brush_size) {
            return Err(Error::InvalidConfig(format!(
                "brush_size {} is outside [{}, {}]",
                self.brush_size, self.brush_min, self.brush_max
            )));
        }
        if !(0.1..=0.4).contains(&self.minimap_size) {
            return Err(Error::InvalidConfig(format!(
                "minimap_size {} is outside 0.1..=0.4",
                self.minimap_size
            )));
        }
        if !(self.minimap_margin >= 0.0) {
            return Err(Error::InvalidConfig("minimap_margin must be >= 0".into()));
        }
        if !(1..=10).contains(&self.grid_line_width) {
            return Err(Error::InvalidConfig(format!(
                "grid_line_width {} is outside 1..=10",
                self.grid_line_width
            )));
        }
        Ok(())
    }

    pub fn world_bounds(&self) -> Result<WorldBounds> {
        WorldBounds::new(self.world_min, self.world_max)
    }

    pub fn minimap(&self) -> MinimapGeometry {
        MinimapGeometry { size: self.minimap_size, margin: self.minimap_margin }
    }

    pub fn save_path(&self) -> PathBuf {
        self.save_path.clone().unwrap_or_else(persist::default_save_path)
    }
}
