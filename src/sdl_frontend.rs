//! SDL2 frontend: the window, the keyboard and the blitting of the shared screen buffer.
//! The frames themselves are painted by the FrameLoop thread.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use tracing::info;

use crate::*;

/// How to wait between two presented frames.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepKind {
    NONE,
    YIELD,
    /// Sleep this many milliseconds.
    SLEEP(u32),
}

pub struct SdlConfiguration {
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub pixel_size: i32,
    pub sleep_kind: SleepKind,
}

impl SdlConfiguration {
    pub fn new(title: &str, width: i32, height: i32, pixel_size: i32, sleep_kind: SleepKind) -> Self {
        Self {
            title: title.to_string(),
            width,
            height,
            pixel_size: pixel_size.max(1),
            sleep_kind,
        }
    }
}

/// Open the window and present `screen` until the window is closed (or Esc is pressed).
/// Input is translated into events on `queue`.
pub fn run_sdl_frontend(cfg: &SdlConfiguration, screen: Arc<Mutex<ScreenBuffer>>, queue: Arc<EventQueue>) -> Result<(), String> {
    let sdl_context = sdl2::init()?;
    let video = sdl_context.video()?;
    let window = video
        .window(
            &cfg.title,
            (cfg.width * cfg.pixel_size) as u32,
            (cfg.height * cfg.pixel_size) as u32,
        )
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;

    let mut canvas = window.into_canvas().accelerated().build().map_err(|e| e.to_string())?;
    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator
        .create_texture_streaming(PixelFormatEnum::RGB888, cfg.width as u32, cfg.height as u32)
        .map_err(|e| e.to_string())?;

    let mut event_pump = sdl_context.event_pump()?;
    let mut inputs = InputMapper::new();
    info!(width = cfg.width, height = cfg.height, "window opened");

    'running: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                _ => inputs.handle_event(&event, cfg.pixel_size, &queue),
            }
        }

        {
            let scrbuf = screen.lock().unwrap_or_else(|e| e.into_inner());
            texture.with_lock(None, |buffer, pitch| scrbuf.copy_to(buffer, pitch))?;
        }
        canvas.copy(&texture, None, None)?;
        canvas.present();

        match cfg.sleep_kind {
            SleepKind::NONE => {}
            SleepKind::YIELD => thread::yield_now(),
            SleepKind::SLEEP(ms) => thread::sleep(Duration::from_millis(ms as u64)),
        }
    }

    info!("window closed");
    Ok(())
}
