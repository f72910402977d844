// Error type for the map core and its host window.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Canvas resolution must be positive, got {0}")]
    InvalidResolution(u32),

    #[error("Degenerate world bounds: min {min:?}, max {max:?}")]
    DegenerateWorldBounds { min: [f32; 2], max: [f32; 2] },

    #[error("World position ({x}, {z}) is not finite")]
    NonFiniteWorldPosition { x: f32, z: f32 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Pixel ({x}, {y}) is outside the {resolution}x{resolution} canvas")]
    OutOfBounds { x: i32, y: i32, resolution: u32 },

    #[error("Pixel buffer has {found} entries, canvas needs {expected}")]
    BufferLength { expected: usize, found: usize },

    #[error("Saved map is {found_w}x{found_h}, canvas is {expected}x{expected}")]
    DimensionMismatch { expected: u32, found_w: u32, found_h: u32 },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Background save thread panicked")]
    SaveThread,

    #[error("Window init error: {0}")]
    WindowInit(String),

    #[error("Window update error: {0}")]
    WindowUpdate(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
