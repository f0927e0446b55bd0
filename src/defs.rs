//!  Various constants and small definitions.

use std::f64::consts::PI;

// movement tuning, in grid cells and seconds
pub const ACC_MAX: f64 = 0.05;
pub const V_MAX: f64 = 1.0;
pub const RETARD_FACTOR: f64 = 0.05;
/// Turn rate, in radians per NANOSECOND of elapsed time.
pub const TURN_RATE: f64 = PI / 2.0 / 1_000_000_000.0;

// facing sign of the camera
pub const AHEAD: f64 = 1.0;
pub const REVERSE: f64 = -1.0;
pub const STOPPED: f64 = 0.0;

// initially look "up" the map, with a field of view of roughly 66 degrees
pub const DEFAULT_DIR: (f64, f64) = (0.0, -1.0);
pub const DEFAULT_PLANE: (f64, f64) = (0.66, 0.0);

pub const TEX_WIDTH: usize = 64;
pub const TEX_HEIGHT: usize = 64;

/// Nudge used by the grid-snapping ray caster, to get off grid lines.
pub const SNAP_EPSILON: f64 = 1e-3;
/// Below this, a ray direction component counts as zero.
pub const EPSILON: f64 = 1e-9;
/// Distance used instead of dividing by a (near) zero direction component.
pub const FAR_AWAY: f64 = 1e30;

pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;

pub const NANOS_PER_SECOND: f64 = 1_000_000_000.0;
