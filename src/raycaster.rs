//! Contains the ray casting algorithms, walking a ray through the grid until it hits a wall.
//!
//! Two interchangeable methods are available, with the same hit semantics:
//! the classic DDA (stepping one cell at a time along the axis with the nearest grid line),
//! and "grid snapping" (jumping from one grid line intersection to the next, by solving
//! the ray's line equation, then sampling the entered cell a tiny step further).

use crate::*;

/// Which kind of grid line the ray crossed when it hit the wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Side {
    /// A horizontal grid line (y = const) -> the hit is on a north/south face.
    Hor,
    /// A vertical grid line (x = const) -> the hit is on a east/west face.
    Ver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display, clap::ValueEnum)]
pub enum CastMethod {
    #[default]
    Dda,
    GridSnap,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Where the ray met the wall, in grid coordinates (on a grid line).
    pub pos: Vector2,
    pub side: Side,
    /// The wall cell that was hit.
    pub cell: (i32, i32),
    /// Euclidean distance from the ray origin to `pos`.
    pub dist: f64,
}

/// Casts rays over a grid of the given size. Stateless apart from its settings,
/// so one caster can be shared by all the columns of a frame.
#[derive(Clone, Copy, Debug)]
pub struct RayCaster {
    width: i32,
    height: i32,
    method: CastMethod,
    epsilon: f64,
}

impl RayCaster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            method: CastMethod::Dda,
            epsilon: SNAP_EPSILON,
        }
    }

    pub fn for_map(map: &GridMap) -> Self {
        Self::new(map.width(), map.height())
    }

    pub fn with_method(mut self, method: CastMethod) -> Self {
        self.method = method;
        self
    }

    /// The nudge used by the grid snapping method. It must be bigger than the
    /// floating point noise at grid lines, and (much) smaller than one cell.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[inline]
    pub fn method(&self) -> CastMethod {
        self.method
    }

    /// Upper bound for the number of grid lines a ray can cross inside the grid.
    #[inline]
    pub fn max_steps(&self) -> usize {
        (self.width + self.height) as usize + 2
    }

    /// Cast a ray from `origin` towards `dir`, until `is_wall(col, row)` says yes.
    /// Returns None if the ray leaves the grid without hitting anything.
    pub fn cast<F>(&self, origin: Vector2, dir: Vector2, is_wall: F) -> Option<RayHit>
    where
        F: Fn(i32, i32) -> bool,
    {
        let dir = dir.normalized();
        if dir.x().abs() <= EPSILON && dir.y().abs() <= EPSILON {
            return None;
        }
        match self.method {
            CastMethod::Dda => self.cast_dda(origin, dir, &is_wall),
            CastMethod::GridSnap => self.cast_snapping(origin, dir, &is_wall),
        }
    }

    #[inline]
    pub fn cast_on(&self, map: &GridMap, origin: Vector2, dir: Vector2) -> Option<RayHit> {
        self.cast(origin, dir, |col, row| map.is_wall(col, row))
    }

    //----------------
    //  Internal stuff

    fn cast_dda(&self, origin: Vector2, dir: Vector2, is_wall: &dyn Fn(i32, i32) -> bool) -> Option<RayHit> {
        let (mut map_x, mut map_y) = origin.cell();
        let mut ray_x = Ray::init(origin.x(), dir.x());
        let mut ray_y = Ray::init(origin.y(), dir.y());

        // keep advancing along the axis with the nearer grid line; each step enters a new cell,
        // so a ray starting inside the grid leaves it in less than max_steps()
        for _ in 0..self.max_steps() {
            let (side, dist) = if ray_x.dist < ray_y.dist {
                map_x += ray_x.step;
                let d = ray_x.dist;
                ray_x.dist += ray_x.scale;
                (Side::Ver, d)
            } else {
                map_y += ray_y.step;
                let d = ray_y.dist;
                ray_y.dist += ray_y.scale;
                (Side::Hor, d)
            };

            if !self.in_bounds(map_x, map_y) {
                return None;
            }
            if is_wall(map_x, map_y) {
                let p = origin + dir * dist;
                // put the hit exactly on the crossed grid line
                let pos = match side {
                    Side::Ver => Vector2::new(Ray::boundary(map_x, ray_x.step), p.y()),
                    Side::Hor => Vector2::new(p.x(), Ray::boundary(map_y, ray_y.step)),
                };
                return Some(RayHit {
                    pos,
                    side,
                    cell: (map_x, map_y),
                    dist: pos.dist_to(origin),
                });
            }
        }
        None
    }

    fn cast_snapping(&self, origin: Vector2, dir: Vector2, is_wall: &dyn Fn(i32, i32) -> bool) -> Option<RayHit> {
        let (mut snap, mut side) = self.snap_step(origin, dir);

        // every snap crosses at least one grid line, the nudges can add a few extra steps
        for _ in 0..2 * self.max_steps() {
            if !self.contains(snap) {
                return None;
            }
            // sample the cell we are entering, not the grid line itself
            let ahead = snap + dir * self.epsilon;
            if !self.contains(ahead) {
                return None;
            }
            let (col, row) = ahead.cell();
            if is_wall(col, row) {
                return Some(RayHit {
                    pos: snap,
                    side,
                    cell: (col, row),
                    dist: snap.dist_to(origin),
                });
            }
            (snap, side) = self.snap_step(snap, dir);
        }
        None
    }

    /// Find the next grid line intersection, in the direction of the ray.
    fn snap_step(&self, from: Vector2, dir: Vector2) -> (Vector2, Side) {
        let mut v = from;
        if on_grid_line(v.x()) || on_grid_line(v.y()) {
            // nudge it in the ray's direction, otherwise the ray would stay in place
            v = v + dir * self.epsilon;
        }

        // the next vertical grid line (x = const)
        let snap_ver = if dir.x().abs() > EPSILON {
            let xs = if dir.x() > 0.0 { v.x().ceil() } else { v.x().floor() };
            // y = m * x + b
            let m = dir.y() / dir.x();
            let b = v.y() - m * v.x();
            Some(Vector2::new(xs, m * xs + b))
        } else {
            None
        };

        // the next horizontal grid line (y = const)
        let snap_hor = if dir.y().abs() > EPSILON {
            let ys = if dir.y() > 0.0 { v.y().ceil() } else { v.y().floor() };
            let xs = if dir.x().abs() > EPSILON {
                // x = (y - b) / m
                let m = dir.y() / dir.x();
                let b = v.y() - m * v.x();
                (ys - b) / m
            } else {
                v.x()
            };
            Some(Vector2::new(xs, ys))
        } else {
            None
        };

        let dist_ver = snap_ver.map_or(FAR_AWAY, |s| s.dist_to(from));
        let dist_hor = snap_hor.map_or(FAR_AWAY, |s| s.dist_to(from));
        match (snap_ver, snap_hor) {
            (Some(s), _) if dist_ver <= dist_hor => (s, Side::Ver),
            (_, Some(s)) => (s, Side::Hor),
            // unreachable for a non-zero direction; stepping outside ends the cast
            _ => (Vector2::new(-1.0, -1.0), Side::Hor),
        }
    }

    #[inline]
    fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.width && row < self.height
    }

    #[inline]
    fn contains(&self, p: Vector2) -> bool {
        p.x() >= 0.0 && p.y() >= 0.0 && p.x() < self.width as f64 && p.y() < self.height as f64
    }
}

//--------------------------
// Internal stuff

/// Progress of the DDA along one axis.
struct Ray {
    /// distance along the ray, to the next grid line on this axis
    dist: f64,
    /// distance along the ray, between two grid lines on this axis
    scale: f64,
    step: i32,
}

impl Ray {
    fn init(p: f64, d: f64) -> Self {
        let p_fl = p.floor();
        if d > EPSILON {
            Self {
                dist: (p_fl + 1.0 - p) / d,
                scale: 1.0 / d,
                step: 1,
            }
        } else if d < -EPSILON {
            Self {
                dist: (p_fl - p) / d,
                scale: -1.0 / d,
                step: -1,
            }
        } else {
            // parallel to this axis => never crosses its grid lines
            Self {
                dist: FAR_AWAY,
                scale: 0.0,
                step: 0,
            }
        }
    }

    /// The grid line crossed when entering `cell` with the given step.
    #[inline]
    fn boundary(cell: i32, step: i32) -> f64 {
        if step > 0 {
            cell as f64
        } else {
            (cell + 1) as f64
        }
    }
}

#[inline]
fn on_grid_line(c: f64) -> bool {
    (c - c.round()).abs() < 1e-9
}

//--------------------------
