//! GRIDCAST - a grid based ray casting engine, with an event driven movement state machine.
//! Main library.

mod defs;
mod events;
mod floorcast;
mod gameloop;
mod gridmap;
mod input;
mod movement;
mod projector;
mod raycaster;
mod scrbuf;
#[cfg(feature = "sdl")]
mod sdl_frontend;
mod texture;
mod utils;
mod vec2;

pub use defs::*;
pub use events::*;
pub use floorcast::*;
pub use gameloop::*;
pub use gridmap::*;
pub use input::*;
pub use movement::*;
pub use projector::*;
pub use raycaster::*;
pub use scrbuf::*;
#[cfg(feature = "sdl")]
pub use sdl_frontend::*;
pub use texture::*;
pub use utils::*;
pub use vec2::*;
