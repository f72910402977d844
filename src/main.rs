// What you SEE:
// • A dark world with a small map in the bottom-right corner; a red arrow
//   shows where you are walking (WASD / arrow keys).
// • E opens the map full screen (world pauses): LMB draws, RMB erases,
//   1-9 pick a color, scroll resizes the brush, C clears, G toggles the grid.
// • R toggles the minimap, H hides every overlay. ESC quits.
// • The map is saved when the full-screen map closes and on exit.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use player_map::blend::GammaLut;
use player_map::config::{self, MapConfig};
use player_map::persist::PngStore;
use player_map::present::{compose, Drawer, MapTexture, Scene};
use player_map::session::MapSession;
use player_map::types::FrameBuffer;
use player_map::view::DisplayMode;
use player_map::walker::Walker;
use player_map::Error;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StartMode {
    Hidden,
    Minimap,
    Fullscreen,
}

impl From<StartMode> for DisplayMode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Hidden => DisplayMode::Hidden,
            StartMode::Minimap => DisplayMode::Minimap,
            StartMode::Fullscreen => DisplayMode::Fullscreen,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "player-map", about = "Paintable map with a live player marker")]
struct Args {
    /// Config file (JSON). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the map PNG is saved.
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Canvas side length in pixels.
    #[arg(long)]
    resolution: Option<u32>,

    /// Display mode at startup.
    #[arg(long, value_enum)]
    start: Option<StartMode>,

    #[arg(long, default_value_t = 1280)]
    width: usize,

    #[arg(long, default_value_t = 720)]
    height: usize,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    /* --- Config: file first, then command-line overrides --- */
    let config_path = args.config.clone().unwrap_or_else(config::default_path);
    let mut cfg = MapConfig::load(&config_path)?;
    if let Some(path) = args.save_path {
        cfg.save_path = Some(path);
    }
    if let Some(resolution) = args.resolution {
        cfg.resolution = resolution;
    }
    if let Some(start) = args.start {
        cfg.initial_mode = start.into();
    }

    let store = PngStore::new(cfg.save_path()).with_background_saves(cfg.background_saves);
    info!(save = %store.path().display(), resolution = cfg.resolution, "opening map");
    let mut session = MapSession::open(cfg, store)?;

    /* --- Window + reusable buffers --- */
    let mut drawer = Drawer::new("Player Map", args.width, args.height)?;
    let mut screen = FrameBuffer::new(args.width, args.height);
    let lut = GammaLut::new();
    let mut texture = MapTexture::new(session.canvas().resolution());

    let mut effects = session.effects();
    drawer.apply_effects(&effects);

    let mut walker = Walker::default();

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut last_frame_time = Instant::now();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = (now - last_frame_time).as_secs_f32();
        last_frame_time = now;

        /* 1) Inputs; the world only advances while the clock runs. */
        let input = drawer.sample_input();
        let (forward, turn) = drawer.walk_axes();
        walker.update(dt * effects.time_scale, forward, turn);
        let world = walker.sample();

        /* 2) One map tick. */
        let out = session.tick(&input, Some(&world));
        let mut rebake = out.upload;
        if let Some(fx) = out.effects {
            drawer.apply_effects(&fx);
            rebake |= fx.grid != effects.grid;
            effects = fx;
        }

        /* 3) Re-upload the texture only when pixels (or the grid) changed. */
        if rebake {
            let grid = effects.grid.then(|| session.grid());
            texture.upload(session.canvas(), grid, &lut);
        }

        /* 4) Compose and present. */
        let status = format!(
            "POS {:.0}, {:.0} | HEADING {:.0} | BRUSH {}",
            world.position[0],
            world.position[2],
            world.yaw_degrees,
            session.brush().size()
        );
        let scene = Scene {
            texture: &texture,
            effects,
            widget: out.widget,
            marker: out.marker,
            palette: session.brush().palette(),
            selected: session.brush().index(),
            brush_size: session.brush().size(),
            pointer: input.pointer,
            status: &status,
        };
        compose(&mut screen, &lut, &scene);
        drawer.present(&screen)?;

        /* 5) FPS counter */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            debug!(fps = frames_this_second as f32 / secs, "frame rate");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    if let Err(e) = session.shutdown() {
        error!(error = %e, "could not save map on exit");
    }
    Ok(())
}
