//!  Various utilities

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Pack a color as 0x00RRGGBB.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
pub fn rgb_components(color: u32) -> (u8, u8, u8) {
    ((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Darker shade of a color (each component scaled by 0.7).
#[inline]
pub fn darker(color: u32) -> u32 {
    let (r, g, b) = rgb_components(color);
    let dim = |c: u8| (c as u32 * 7 / 10) as u8;
    rgb(dim(r), dim(g), dim(b))
}

/// Scale each component by `factor` (clamped to 0..=1).
#[inline]
pub fn shade(color: u32, factor: f64) -> u32 {
    let f = factor.clamp(0.0, 1.0);
    let (r, g, b) = rgb_components(color);
    let dim = |c: u8| (c as f64 * f) as u8;
    rgb(dim(r), dim(g), dim(b))
}

//-------------------
