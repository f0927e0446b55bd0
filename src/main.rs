//! GRIDCAST - a grid based ray casting engine.
//! Main starting point: the window runs on the main thread, the frames are painted on their own thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gridcast::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SLEEP_KIND: SleepKind = SleepKind::SLEEP(1);

#[derive(Parser, Debug)]
#[command(name = "gridcast", about = "Walk around a grid map, rendered by ray casting")]
struct Args {
    /// Screen width, in (logical) pixels
    #[arg(long, default_value_t = 640)]
    width: usize,
    /// Screen height, in (logical) pixels
    #[arg(long, default_value_t = 480)]
    height: usize,
    /// Size of one logical pixel, in window pixels
    #[arg(long, default_value_t = 1)]
    pixel_size: i32,
    /// Target ticks per second
    #[arg(long, default_value_t = DEFAULT_TICKS_PER_SECOND)]
    fps: u32,
    /// Text map file (one digit per cell); the built-in demo map if missing
    #[arg(long)]
    map: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = CastMethod::Dda)]
    method: CastMethod,
    /// Nudge used by the grid-snap method
    #[arg(long, default_value_t = SNAP_EPSILON)]
    epsilon: f64,
    /// Plain sky and floor colors instead of the textured floor and ceiling
    #[arg(long)]
    flat_floor: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let map = match &args.map {
        Some(path) => GridMap::load(path).with_context(|| format!("cannot load map {}", path.display()))?,
        None => GridMap::demo(),
    };
    let map = Arc::new(map);
    let (col, row) = map.center().cell();
    let camera = CameraState::spawn(&map, col, row).context("cannot place the camera in the middle of the map")?;

    let config = LoopConfig {
        ticks_per_second: args.fps,
        screen_width: args.width,
        screen_height: args.height,
        cast_method: args.method,
        epsilon: args.epsilon,
        textured_floor: !args.flat_floor,
        ..LoopConfig::default()
    };
    let queue = Arc::new(EventQueue::new());
    let screen = Arc::new(Mutex::new(ScreenBuffer::new(args.width, args.height)));

    // paint the frames on their own thread
    let game = GameLoop::new(&config, Arc::clone(&map), camera, Arc::clone(&queue));
    let frames = FrameLoop::spawn(game, Arc::clone(&screen), config.frame_period())?;

    // main loop
    let sdl_config = SdlConfiguration::new("GRIDCAST", args.width as i32, args.height as i32, args.pixel_size, SLEEP_KIND);
    let result = run_sdl_frontend(&sdl_config, screen, queue);

    let game = frames.join()?;
    info!(ticks = game.ticks(), fps = ?game.camera().fps(), "GRIDCAST finished");
    result.map_err(|msg| anyhow!("SDL error: {msg}"))
}
