//! Main game loop.
//! One tick = drain the input, update the camera, paint floor and ceiling, project the walls.
//! The FrameLoop runs the ticks on its own thread, at a fixed rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::*;

#[derive(Clone, Debug)]
pub struct LoopConfig {
    pub ticks_per_second: u32,
    pub screen_width: usize,
    pub screen_height: usize,
    pub cast_method: CastMethod,
    /// Nudge used by the grid snapping caster.
    pub epsilon: f64,
    /// Longer frames (e.g. after the process was suspended) are integrated as this much time.
    pub max_frame_delta: Duration,
    /// Textured floor and ceiling; flat sky and floor colors otherwise.
    pub textured_floor: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            screen_width: 640,
            screen_height: 480,
            cast_method: CastMethod::Dda,
            epsilon: SNAP_EPSILON,
            max_frame_delta: Duration::from_millis(250),
            textured_floor: true,
        }
    }
}

impl LoopConfig {
    /// Target duration of one tick.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.ticks_per_second.max(1) as f64)
    }

    pub fn caster_for(&self, map: &GridMap) -> RayCaster {
        RayCaster::for_map(map)
            .with_method(self.cast_method)
            .with_epsilon(self.epsilon)
    }
}

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("failed to spawn the frame loop thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("the frame loop thread panicked")]
    Panicked,
}

/// Holds everything a tick needs. The map is shared read-only, the queue is shared
/// with the input producers, the camera is owned (only the loop modifies it).
pub struct GameLoop {
    map: Arc<GridMap>,
    camera: CameraState,
    queue: Arc<EventQueue>,
    projector: Projector,
    floor: Option<FloorCaster>,
    max_frame_delta: Duration,
    ticks: u64,
}

impl GameLoop {
    pub fn new(config: &LoopConfig, map: Arc<GridMap>, camera: CameraState, queue: Arc<EventQueue>) -> Self {
        let projector = Projector::new(config.screen_width, config.screen_height, config.caster_for(&map));
        Self {
            map,
            camera,
            queue,
            projector,
            floor: config.textured_floor.then(|| FloorCaster::standard(0)),
            max_frame_delta: config.max_frame_delta,
            ticks: 0,
        }
    }

    #[inline]
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    #[inline]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[inline]
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn cast_method(&self) -> CastMethod {
        self.projector.caster().method()
    }

    /// Run one tick, painting the frame into `screen`. Returns the number of wall columns drawn.
    pub fn tick(&mut self, dt: Duration, screen: &mut ScreenBuffer) -> usize {
        self.camera.update(dt.min(self.max_frame_delta), &self.map, &self.queue);
        self.ticks += 1;

        // the screen may have been resized since the last frame
        if (self.projector.width(), self.projector.height()) != (screen.width(), screen.height()) {
            debug!(width = screen.width(), height = screen.height(), "screen resized");
            self.projector.resize(screen.width(), screen.height());
        }
        match &self.floor {
            Some(floor) => floor.render(&self.camera, screen),
            None => screen.clear_frame(),
        }
        self.projector.render(&self.camera, &self.map, screen)
    }
}

//-----------------------

/// Runs a GameLoop on its own thread.
pub struct FrameLoop;

impl FrameLoop {
    /// Start ticking `game` every `period`. The screen buffer stays locked while a frame is painted.
    pub fn spawn(game: GameLoop, screen: Arc<Mutex<ScreenBuffer>>, period: Duration) -> Result<FrameLoopHandle, LoopError> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("frame-loop".into())
            .spawn(move || run_frames(game, screen, period, stop_flag))
            .map_err(LoopError::Spawn)?;
        Ok(FrameLoopHandle { stop, thread })
    }
}

pub struct FrameLoopHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<GameLoop>,
}

impl FrameLoopHandle {
    /// Ask the loop to stop; it finishes the current tick first.
    #[inline]
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Stop the loop and wait for it. Gives back the game, in its final state.
    pub fn join(self) -> Result<GameLoop, LoopError> {
        self.stop();
        self.thread.join().map_err(|_| LoopError::Panicked)
    }
}

//----------------------
//  Internal stuff

fn run_frames(mut game: GameLoop, screen: Arc<Mutex<ScreenBuffer>>, period: Duration, stop: Arc<AtomicBool>) -> GameLoop {
    info!(
        period_ms = period.as_secs_f64() * 1000.0,
        method = %game.cast_method(),
        "frame loop started"
    );
    let mut last = Instant::now();

    while !stop.load(Ordering::Acquire) {
        let start = Instant::now();
        let dt = start - last;
        last = start;

        {
            // a panic while painting leaves some stale pixels at worst
            let mut scrbuf = screen.lock().unwrap_or_else(|e| e.into_inner());
            game.tick(dt, &mut scrbuf);
        }

        let spent = start.elapsed();
        if spent > period {
            warn!(
                tick = game.ticks(),
                spent_ms = spent.as_secs_f64() * 1000.0,
                budget_ms = period.as_secs_f64() * 1000.0,
                "frame overran its budget"
            );
        } else {
            thread::sleep(period - spent);
        }
    }

    info!(ticks = game.ticks(), "frame loop stopped");
    game
}

//-----------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn game(config: &LoopConfig) -> GameLoop {
        let map = Arc::new(GridMap::demo());
        let camera = CameraState::new(map.center());
        GameLoop::new(config, map, camera, Arc::new(EventQueue::new()))
    }

    #[test]
    fn default_period_is_sixty_hz() {
        let period = LoopConfig::default().frame_period();
        assert!((period.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn tick_applies_queued_input_then_paints() {
        let config = LoopConfig::default();
        let mut game = game(&config);
        let mut screen = ScreenBuffer::new(64, 48);
        let y0 = game.camera().pos().y();

        game.queue().push(EventTag::MoveForward);
        let drawn = game.tick(Duration::from_millis(100), &mut screen);

        assert_eq!(drawn, 64);
        assert_eq!(game.camera().state(), MotionState::Moving);
        assert!(game.camera().pos().y() < y0);
        assert!(game.queue().is_empty());
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn huge_frames_are_clamped() {
        let config = LoopConfig {
            max_frame_delta: Duration::from_millis(250),
            ..LoopConfig::default()
        };
        let mut game = game(&config);
        let mut screen = ScreenBuffer::new(8, 8);
        game.queue().push(EventTag::MoveForward);
        game.tick(Duration::from_secs(30), &mut screen);
        assert!((game.camera().velocity() - ACC_MAX * 0.25).abs() < 1e-12);
    }

    #[test]
    fn projector_follows_screen_size() {
        let mut game = game(&LoopConfig::default());
        let mut screen = ScreenBuffer::new(32, 24);
        assert_eq!(game.tick(Duration::ZERO, &mut screen), 32);
        screen.resize(50, 20);
        assert_eq!(game.tick(Duration::ZERO, &mut screen), 50);
    }

    #[test]
    fn grid_snap_config_is_used() {
        let config = LoopConfig {
            cast_method: CastMethod::GridSnap,
            epsilon: 1e-5,
            ..LoopConfig::default()
        };
        let caster = config.caster_for(&GridMap::demo());
        assert_eq!(caster.method(), CastMethod::GridSnap);
        assert_eq!(game(&config).cast_method(), CastMethod::GridSnap);
    }

    #[test]
    fn floor_is_textured_or_flat() {
        let mut screen = ScreenBuffer::new(32, 24).with_colors(1, 2);
        game(&LoopConfig::default()).tick(Duration::ZERO, &mut screen);
        assert!(screen.pixels().iter().all(|&p| p != 1 && p != 2));

        let flat = LoopConfig {
            textured_floor: false,
            ..LoopConfig::default()
        };
        game(&flat).tick(Duration::ZERO, &mut screen);
        assert!(screen.pixels().contains(&2));
    }
}
