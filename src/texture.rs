//! Wall textures - procedurally generated, plus flat colors for the cells without one.

use crate::*;

/// The built-in texture patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
pub enum TexturePattern {
    XorGray,
    RedBricks,
    VertYellow,
    HorizBlue,
    RedCross,
}

/// A wall texture, as 0x00RRGGBB texels.
/// Each texture is stored as columns, then rows (flipped), since walls are drawn column by column.
#[derive(Clone, Debug)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<u32>,
}

impl Texture {
    /// Build a texture from a `(x, y) -> color` function.
    pub fn from_fn<F: FnMut(usize, usize) -> u32>(width: usize, height: usize, mut f: F) -> Self {
        let mut texels = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                texels.push(f(x, y));
            }
        }
        Self { width, height, texels }
    }

    /// Generate one of the built-in patterns. The rng only adds some noise to the bricks.
    pub fn generate(pattern: TexturePattern, width: usize, height: usize, rng: &mut fastrand::Rng) -> Self {
        let (w, h) = (width.max(1), height.max(1));
        match pattern {
            TexturePattern::XorGray => Self::from_fn(width, height, |x, y| {
                let c = ((x * 256 / w) ^ (y * 256 / h)) as u8;
                rgb(c, c, c)
            }),
            TexturePattern::RedBricks => {
                let bw = (w / 4).max(2);
                let bh = (h / 8).max(2);
                Self::from_fn(width, height, |x, y| {
                    // every other brick row is shifted by half a brick
                    let shift = if (y / bh) % 2 == 0 { 0 } else { bw / 2 };
                    if y % bh == 0 || (x + shift) % bw == 0 {
                        rgb(0x60, 0x60, 0x60)
                    } else {
                        rgb(0xA0 + rng.u8(..0x40), 0x10 + rng.u8(..0x10), 0x10)
                    }
                })
            }
            TexturePattern::VertYellow => {
                let sw = (w / 8).max(1);
                Self::from_fn(width, height, |x, _| {
                    if (x / sw) % 2 == 0 {
                        rgb(0xFF, 0xDC, 0x00)
                    } else {
                        rgb(0xB4, 0x96, 0x00)
                    }
                })
            }
            TexturePattern::HorizBlue => {
                let sh = (h / 8).max(1);
                Self::from_fn(width, height, |_, y| {
                    if (y / sh) % 2 == 0 {
                        rgb(0x20, 0x40, 0xFF)
                    } else {
                        rgb(0x10, 0x20, 0x90)
                    }
                })
            }
            TexturePattern::RedCross => Self::from_fn(width, height, |x, y| {
                // both diagonals
                let (fx, fy) = (x as f64 / w as f64, y as f64 / h as f64);
                if (fx - fy).abs() < 0.05 || (fx + fy - 1.0).abs() < 0.05 {
                    rgb(0, 0, 0)
                } else {
                    rgb(0xC0, 0x00, 0x00)
                }
            }),
        }
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The texel at (x, y); coordinates outside the texture are clamped.
    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        if self.texels.is_empty() {
            return 0;
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.texels[x * self.height + y]
    }

    /// Sample the texture at fractional texture coordinates.
    #[inline]
    pub fn sample(&self, u: f64, v: f64) -> u32 {
        self.texel(u.max(0.0) as usize, v.max(0.0) as usize)
    }
}

//-----------------------

/// What is painted for each cell code: a texture or a flat color.
pub struct WallTextures {
    by_code: Vec<Option<Texture>>,
}

impl WallTextures {
    /// Flat colors only.
    pub fn flat() -> Self {
        Self { by_code: vec![] }
    }

    /// Textures for the cell codes 1 to 5, flat colors for the rest.
    pub fn standard(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut make = |p| Some(Texture::generate(p, TEX_WIDTH, TEX_HEIGHT, &mut rng));
        Self {
            by_code: vec![
                None,
                make(TexturePattern::HorizBlue),
                make(TexturePattern::VertYellow),
                make(TexturePattern::RedBricks),
                make(TexturePattern::RedCross),
                make(TexturePattern::XorGray),
            ],
        }
    }

    pub fn with_texture(mut self, code: u8, texture: Texture) -> Self {
        let idx = code as usize;
        if self.by_code.len() <= idx {
            self.by_code.resize(idx + 1, None);
        }
        self.by_code[idx] = Some(texture);
        self
    }

    #[inline]
    pub fn texture(&self, code: u8) -> Option<&Texture> {
        self.by_code.get(code as usize).and_then(|t| t.as_ref())
    }

    /// Color of the slice at a given screen row.
    pub fn color_at(&self, slice: &ColumnSlice, y: i32) -> u32 {
        match self.texture(slice.cell_code) {
            Some(tex) => {
                let rows = (slice.y_end - slice.y_start + 1).max(1) as f64;
                let t = (y - slice.y_start) as f64 / rows;
                tex.sample(slice.tex_u0, lerp(slice.tex_v0, slice.tex_v1, t))
            }
            None => flat_color(slice.cell_code, slice.side),
        }
    }
}

/// Fallback color of a wall cell; walls hit on a vertical grid line are darker.
pub fn flat_color(code: u8, side: Side) -> u32 {
    let color = match code {
        1 => rgb(0xFF, 0, 0),
        2 => rgb(0, 0xFF, 0),
        3 => rgb(0, 0, 0xFF),
        4 => rgb(0xFF, 0xFF, 0xFF),
        _ => rgb(0xFF, 0xFF, 0),
    };
    match side {
        Side::Hor => color,
        Side::Ver => darker(color),
    }
}

//-----------------------
