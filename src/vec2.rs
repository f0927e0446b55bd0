//! Vector2 - a small 2D vector value type, plus an arena for hot inner loops.

use std::ops::{Add, Mul, Neg, Sub};

/// 2D vector of doubles.
/// The `normalized` flag is only a hint: when set, `len()` is known to be 1
/// and `normalized()` is free. Operations which may change the length clear it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vector2 {
    x: f64,
    y: f64,
    normalized: bool,
}

impl Vector2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, normalized: false }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Caller guarantees that x*x + y*y == 1.
    #[inline]
    const fn new_unit(x: f64, y: f64) -> Self {
        Self { x, y, normalized: true }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Squared length.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn len(&self) -> f64 {
        if self.normalized {
            1.0
        } else {
            self.norm().sqrt()
        }
    }

    /// Returns the unit vector with the same direction.
    /// A zero vector stays zero (and is NOT flagged as normalized).
    pub fn normalized(self) -> Self {
        if self.normalized {
            return self;
        }
        let len = self.len();
        if len == 0.0 {
            return self;
        }
        Self::new_unit(self.x / len, self.y / len)
    }

    #[inline]
    pub fn scaled(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    /// Component-wise product.
    #[inline]
    pub fn component_mul(self, v: Vector2) -> Self {
        Self::new(self.x * v.x, self.y * v.y)
    }

    #[inline]
    pub fn dot(&self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    /// Fractional part of both components, in [0, 1).
    #[inline]
    pub fn fract(self) -> Self {
        self - self.floor()
    }

    /// Index of the grid cell containing this point.
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Rotation by `rad` radians; the length is preserved, so is the flag.
    pub fn rotated(self, rad: f64) -> Self {
        let (sin, cos) = rad.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
            normalized: self.normalized,
        }
    }

    #[inline]
    pub fn rotated_ccw(self) -> Self {
        Self { x: -self.y, y: self.x, normalized: self.normalized }
    }

    #[inline]
    pub fn rotated_cw(self) -> Self {
        Self { x: self.y, y: -self.x, normalized: self.normalized }
    }

    #[inline]
    pub fn dist_to(&self, p: Vector2) -> f64 {
        (self.x - p.x).hypot(self.y - p.y)
    }

    /// Distance from this point to the line going through `p`, with direction `dir`.
    pub fn perp_dist_to_line(&self, p: Vector2, dir: Vector2) -> f64 {
        let n = dir.rotated_ccw();
        let len = n.len();
        if len == 0.0 {
            return self.dist_to(p);
        }
        ((*self - p).dot(n) / len).abs()
    }
}

impl PartialEq for Vector2 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    #[inline]
    fn neg(self) -> Vector2 {
        Vector2 { x: -self.x, y: -self.y, normalized: self.normalized }
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    #[inline]
    fn mul(self, s: f64) -> Vector2 {
        self.scaled(s)
    }
}

impl From<(f64, f64)> for Vector2 {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

//----------------------------------
// Arena

/// Handle to a vector stored in a [`Vec2Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct V2(u32);

/// Bump arena of vectors, for per-pixel loops.
/// All handles are invalidated by `clear()` (or by `reset_to()` for handles
/// created after the mark). The storage is kept, so a warm arena never allocates.
pub struct Vec2Arena {
    items: Vec<Vector2>,
}

impl Vec2Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checkpoint, to be used with `reset_to()`.
    #[inline]
    pub fn mark(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn reset_to(&mut self, mark: usize) {
        self.items.truncate(mark);
    }

    #[inline]
    pub fn put(&mut self, v: Vector2) -> V2 {
        self.items.push(v);
        V2((self.items.len() - 1) as u32)
    }

    #[inline]
    pub fn c(&mut self, x: f64, y: f64) -> V2 {
        self.put(Vector2::new(x, y))
    }

    #[inline]
    pub fn get(&self, h: V2) -> Vector2 {
        self.items[h.0 as usize]
    }

    #[inline]
    pub fn add(&mut self, a: V2, b: V2) -> V2 {
        self.put(self.get(a) + self.get(b))
    }

    #[inline]
    pub fn sub(&mut self, a: V2, b: V2) -> V2 {
        self.put(self.get(a) - self.get(b))
    }

    #[inline]
    pub fn mul(&mut self, a: V2, b: V2) -> V2 {
        self.put(self.get(a).component_mul(self.get(b)))
    }

    #[inline]
    pub fn scaled(&mut self, a: V2, s: f64) -> V2 {
        self.put(self.get(a).scaled(s))
    }

    #[inline]
    pub fn normalized(&mut self, a: V2) -> V2 {
        self.put(self.get(a).normalized())
    }

    #[inline]
    pub fn fract(&mut self, a: V2) -> V2 {
        self.put(self.get(a).fract())
    }
}

//----------------------------------
