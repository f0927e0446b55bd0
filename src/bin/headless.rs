//! GRIDCAST headless renderer: plays a scripted walk through the map, without a window,
//! then saves the last frame as a PPM image.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gridcast::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gridcast-headless", about = "Render a scripted walk through a grid map into a PPM file")]
struct Args {
    #[arg(long, default_value_t = 320)]
    width: usize,
    #[arg(long, default_value_t = 200)]
    height: usize,
    /// Number of frames to simulate
    #[arg(long, default_value_t = 180)]
    frames: u32,
    /// Simulated ticks per second
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
    /// Where to save the last frame
    #[arg(long, default_value = "gridcast.ppm")]
    out: PathBuf,
}

/// Walk forward, turn left for a while, then slow down.
fn scripted_input(frame: u32, frames: u32) -> Option<EventTag> {
    match frame {
        0 => Some(EventTag::MoveForward),
        f if f == frames / 3 => Some(EventTag::TurnLeft),
        f if f == frames / 2 => Some(EventTag::StopTurning),
        f if f == frames * 2 / 3 => Some(EventTag::Decelerate),
        _ => None,
    }
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
    let mut game = GameLoop::new(&config, map, camera, Arc::clone(&queue));
    let mut screen = ScreenBuffer::new(args.width, args.height);

    // simulated time, so the result does not depend on the machine
    let dt: Duration = config.frame_period();
    let mut drawn = 0;
    for frame in 0..args.frames {
        if let Some(tag) = scripted_input(frame, args.frames) {
            queue.push(tag);
        }
        drawn = game.tick(dt, &mut screen);
    }

    let cam = game.camera();
    info!(
        frames = args.frames,
        columns = drawn,
        x = cam.pos().x(),
        y = cam.pos().y(),
        state = %cam.state(),
        "walk finished"
    );

    screen
        .save_ppm(&args.out)
        .with_context(|| format!("cannot write {}", args.out.display()))?;
    info!(path = %args.out.display(), "frame saved");
    Ok(())
}
