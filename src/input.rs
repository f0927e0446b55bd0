//! InputMapper - turns key presses / releases and mouse motion into queued game events.

use std::collections::HashSet;

use crate::*;

/// The actions the keyboard can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum KeyAction {
    Forward,
    Backward,
    Left,
    Right,
}

impl KeyAction {
    /// Event sent when the key goes down.
    #[inline]
    pub fn press_event(self) -> EventTag {
        match self {
            KeyAction::Forward => EventTag::MoveForward,
            KeyAction::Backward => EventTag::MoveBackward,
            KeyAction::Left => EventTag::TurnLeft,
            KeyAction::Right => EventTag::TurnRight,
        }
    }

    /// Event sent when the key is released.
    #[inline]
    pub fn release_event(self) -> EventTag {
        match self {
            KeyAction::Forward | KeyAction::Backward => EventTag::Decelerate,
            KeyAction::Left | KeyAction::Right => EventTag::StopTurning,
        }
    }
}

/// Remembers which actions are held down, so that auto-repeated key presses
/// do not flood the queue with duplicate events.
#[derive(Default)]
pub struct InputMapper {
    pressed: HashSet<KeyAction>,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_pressed(&self, action: KeyAction) -> bool {
        self.pressed.contains(&action)
    }

    /// Returns true if an event was queued.
    pub fn key_down(&mut self, action: KeyAction, queue: &EventQueue) -> bool {
        if !self.pressed.insert(action) {
            return false;
        }
        queue.push(action.press_event());
        true
    }

    /// Returns true if an event was queued.
    pub fn key_up(&mut self, action: KeyAction, queue: &EventQueue) -> bool {
        if !self.pressed.remove(&action) {
            return false;
        }
        queue.push(action.release_event());
        true
    }

    #[inline]
    pub fn pointer_moved(&mut self, x: f64, y: f64, queue: &EventQueue) {
        queue.push_event(GameEvent::with_point(EventTag::PointerMove, Vector2::new(x, y)));
    }
}

#[cfg(feature = "sdl")]
mod sdl_keys {
    use super::*;
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;

    /// WASD, the arrow keys, and the vi keys (H J K L).
    pub fn key_action(key: Keycode) -> Option<KeyAction> {
        match key {
            Keycode::W | Keycode::Up | Keycode::J => Some(KeyAction::Forward),
            Keycode::S | Keycode::Down | Keycode::K => Some(KeyAction::Backward),
            Keycode::A | Keycode::Left | Keycode::H => Some(KeyAction::Left),
            Keycode::D | Keycode::Right | Keycode::L => Some(KeyAction::Right),
            _ => None,
        }
    }

    impl InputMapper {
        pub fn handle_event(&mut self, event: &Event, pixel_size: i32, queue: &EventQueue) {
            match event {
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(action) = key_action(*key) {
                        self.key_down(action, queue);
                    }
                }
                Event::KeyUp { keycode: Some(key), .. } => {
                    if let Some(action) = key_action(*key) {
                        self.key_up(action, queue);
                    }
                }
                Event::MouseMotion { x, y, .. } => {
                    let ps = pixel_size.max(1);
                    self.pointer_moved((*x / ps) as f64, (*y / ps) as f64, queue);
                }
                _ => {}
            }
        }
    }
}

#[cfg(feature = "sdl")]
pub use sdl_keys::key_action;

//-------------------
