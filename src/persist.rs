//! Saved-map persistence.
//!
//! The canvas is stored as a lossless RGBA8 PNG (default
//! `~/.local/share/player-map/playermap.png`). PNG rows run top-down while
//! canvas rows run bottom-up, so rows are flipped on the way in and out; the
//! file looks like the map in any image viewer.
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the target, so
//! a crash mid-save never leaves a truncated map behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use image::{ImageFormat, ImageReader, Rgba, RgbaImage};
use tracing::{debug, error, info};

use crate::canvas::RasterCanvas;
use crate::error::{Error, Result};
use crate::types::Color;

/// File name of the saved map inside the data directory.
pub const SAVE_FILE_NAME: &str = "playermap.png";

/// Default saved-map path.
pub fn default_save_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("player-map")
        .join(SAVE_FILE_NAME)
}

/// Result of looking for a saved map.
#[derive(Debug, PartialEq)]
pub enum LoadOutcome {
    /// Decoded pixels, bottom row first, length `R*R`.
    Loaded(Vec<Color>),
    /// Nothing saved yet (first run).
    NoPriorSave,
}

/// Encode the canvas and atomically replace `path` with it.
pub fn save(canvas: &RasterCanvas, path: &Path) -> Result<()> {
    write_png(canvas.resolution(), canvas.pixels(), path)
}

/// Decode the map at `path`. The image must be exactly `resolution` square.
pub fn load(path: &Path, resolution: u32) -> Result<LoadOutcome> {
    let reader = match ImageReader::open(path) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::NoPriorSave),
        Err(e) => return Err(Error::io(path, e)),
    };
    let img = reader
        .with_guessed_format()
        .map_err(|e| Error::io(path, e))?
        .decode()?
        .to_rgba8();

    let (w, h) = img.dimensions();
    if w != resolution || h != resolution {
        return Err(Error::DimensionMismatch { expected: resolution, found_w: w, found_h: h });
    }

    let mut pixels = Vec::with_capacity(resolution as usize * resolution as usize);
    for y in 0..resolution {
        let row = resolution - 1 - y;
        for x in 0..resolution {
            let Rgba([r, g, b, a]) = *img.get_pixel(x, row);
            pixels.push(Color::rgba(r, g, b, a));
        }
    }
    Ok(LoadOutcome::Loaded(pixels))
}

fn to_image(resolution: u32, pixels: &[Color]) -> RgbaImage {
    let r = resolution as usize;
    let mut img = RgbaImage::new(resolution, resolution);
    for y in 0..resolution {
        for x in 0..resolution {
            let c = pixels[y as usize * r + x as usize];
            img.put_pixel(x, resolution - 1 - y, Rgba([c.r, c.g, c.b, c.a]));
        }
    }
    img
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_else(|| OsString::from(SAVE_FILE_NAME));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_png(resolution: u32, pixels: &[Color], path: &Path) -> Result<()> {
    let img = to_image(resolution, pixels);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = File::create(&tmp)
        .map_err(|e| Error::io(&tmp, e))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            img.write_to(&mut writer, ImageFormat::Png)?;
            // Data must be on disk before the rename makes it the live save.
            let file = writer.into_inner().map_err(|e| Error::io(&tmp, e.into_error()))?;
            file.sync_all().map_err(|e| Error::io(&tmp, e))
        });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), resolution, "map written");
    Ok(())
}

/// Owned copy of the canvas taken inside a tick, safe to encode elsewhere.
pub struct CanvasSnapshot {
    resolution: u32,
    pixels: Vec<Color>,
}

impl CanvasSnapshot {
    pub fn of(canvas: &RasterCanvas) -> Self {
        Self { resolution: canvas.resolution(), pixels: canvas.pixels().to_vec() }
    }

    pub fn write_png(&self, path: &Path) -> Result<()> {
        write_png(self.resolution, &self.pixels, path)
    }
}

/// Encode and write a snapshot on a background thread.
pub fn spawn_save(snapshot: CanvasSnapshot, path: PathBuf) -> Result<JoinHandle<Result<()>>> {
    let target = path.clone();
    std::thread::Builder::new()
        .name("map-save".into())
        .spawn(move || snapshot.write_png(&path))
        .map_err(|e| Error::io(target, e))
}

/// Where the session persists its canvas.
pub trait CanvasStore {
    fn save(&mut self, canvas: &RasterCanvas) -> Result<()>;
    fn load(&mut self, resolution: u32) -> Result<LoadOutcome>;
    /// Wait for any save still in flight.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// PNG file on disk, optionally written from a background thread.
pub struct PngStore {
    path: PathBuf,
    background: bool,
    pending: Option<JoinHandle<Result<()>>>,
}

impl PngStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), background: false, pending: None }
    }

    /// Encode + write on a worker thread; at most one save is in flight.
    pub fn with_background_saves(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn join_pending(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(handle) => handle.join().map_err(|_| Error::SaveThread)?,
            None => Ok(()),
        }
    }
}

impl CanvasStore for PngStore {
    fn save(&mut self, canvas: &RasterCanvas) -> Result<()> {
        if !self.background {
            save(canvas, &self.path)?;
            info!(path = %self.path.display(), "map saved");
            return Ok(());
        }
        if let Err(e) = self.join_pending() {
            error!(error = %e, "previous background save failed");
        }
        let snapshot = CanvasSnapshot::of(canvas);
        self.pending = Some(spawn_save(snapshot, self.path.clone())?);
        info!(path = %self.path.display(), "map save started");
        Ok(())
    }

    fn load(&mut self, resolution: u32) -> Result<LoadOutcome> {
        self.join_pending()?;
        load(&self.path, resolution)
    }

    fn flush(&mut self) -> Result<()> {
        self.join_pending()
    }
}

impl Drop for PngStore {
    fn drop(&mut self) {
        if let Err(e) = self.join_pending() {
            error!(error = %e, "background save failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelPos;
    use tempfile::tempdir;

    fn striped_canvas() -> RasterCanvas {
        let mut canvas = RasterCanvas::new(64, Color::rgb(230, 217, 179)).unwrap();
        canvas.draw_stroke(PixelPos::new(2, 2), PixelPos::new(60, 40), Color::BLACK, 3);
        canvas.draw_stroke(PixelPos::new(0, 63), PixelPos::new(63, 0), Color::rgba(10, 120, 5, 128), 5);
        canvas.stamp(63, 63, Color::RED, 2);
        canvas
    }

    #[test]
    fn test_missing_file_is_no_prior_save() {
        let dir = tempdir().unwrap();
        let out = load(&dir.path().join("playermap.png"), 64).unwrap();
        assert_eq!(out, LoadOutcome::NoPriorSave);
    }

    #[test]
    fn test_round_trip_with_strokes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("playermap.png");
        let canvas = striped_canvas();
        save(&canvas, &path).unwrap();
        assert!(!temp_path(&path).exists());

        match load(&path, 64).unwrap() {
            LoadOutcome::Loaded(pixels) => assert_eq!(pixels.as_slice(), canvas.pixels()),
            LoadOutcome::NoPriorSave => panic!("expected a saved map"),
        }
    }

    #[test]
    fn test_overwrite_replaces_previous_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playermap.png");
        save(&striped_canvas(), &path).unwrap();
        let blank = RasterCanvas::new(64, Color::WHITE).unwrap();
        save(&blank, &path).unwrap();
        assert!(!temp_path(&path).exists());
        assert_eq!(load(&path, 64).unwrap(), LoadOutcome::Loaded(blank.pixels().to_vec()));
    }

    #[test]
    fn test_spawn_save_writes_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playermap.png");
        let canvas = striped_canvas();
        let handle = spawn_save(CanvasSnapshot::of(&canvas), path.clone()).unwrap();
        handle.join().unwrap().unwrap();
        assert_eq!(load(&path, 64).unwrap(), LoadOutcome::Loaded(canvas.pixels().to_vec()));
    }

    #[test]
    fn test_round_trip_cleared_canvas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playermap.png");
        let mut canvas = striped_canvas();
        canvas.clear(Color::WHITE);
        save(&canvas, &path).unwrap();
        assert_eq!(load(&path, 64).unwrap(), LoadOutcome::Loaded(canvas.pixels().to_vec()));
    }

    #[test]
    fn test_png_rows_are_top_down() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playermap.png");
        let mut canvas = RasterCanvas::new(8, Color::WHITE).unwrap();
        canvas.stamp(0, 0, Color::BLACK, 0);
        save(&canvas, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 7).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playermap.png");
        fs::write(&path, b"definitely not a png").unwrap();
        assert!(load(&path, 64).is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playermap.png");
        save(&striped_canvas(), &path).unwrap();
        let err = load(&path, 128).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 128, found_w: 64, found_h: 64 }));
    }

    #[test]
    fn test_unwritable_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        // Parent "directory" is a regular file.
        let err = save(&striped_canvas(), &blocker.join("playermap.png")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_background_store_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = PngStore::new(dir.path().join("playermap.png")).with_background_saves(true);
        let mut canvas = striped_canvas();
        store.save(&canvas).unwrap();
        // Mutating after the snapshot must not leak into the file.
        let saved = canvas.pixels().to_vec();
        canvas.clear(Color::BLUE);
        store.flush().unwrap();
        assert_eq!(store.load(64).unwrap(), LoadOutcome::Loaded(saved));
    }
}
