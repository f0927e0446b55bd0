//! ScreenBuffer - the frame buffer the walls are painted into.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::*;

const SKY_COLOR: u32 = rgb(0x38, 0x38, 0x38);
const FLOOR_COLOR: u32 = rgb(0x70, 0x70, 0x70);

/// 0x00RRGGBB pixels, row by row.
pub struct ScreenBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    walls: Arc<WallTextures>,
    sky_color: u32,
    floor_color: u32,
}

impl ScreenBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_walls(width, height, Arc::new(WallTextures::standard(0)))
    }

    pub fn with_walls(width: usize, height: usize, walls: Arc<WallTextures>) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            walls,
            sky_color: SKY_COLOR,
            floor_color: FLOOR_COLOR,
        }
    }

    pub fn with_colors(mut self, sky_color: u32, floor_color: u32) -> Self {
        self.sky_color = sky_color;
        self.floor_color = floor_color;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Resize the buffer; the content is lost (it is repainted every frame anyway).
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[(y as usize) * self.width + (x as usize)] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(self.pixels[(y as usize) * self.width + (x as usize)])
        } else {
            None
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.clamp(0, self.width as i32) as usize;
        let x1 = (x + w).clamp(0, self.width as i32) as usize;
        let y0 = y.clamp(0, self.height as i32) as usize;
        let y1 = (y + h).clamp(0, self.height as i32) as usize;
        for row in y0..y1 {
            let start = row * self.width;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }

    /// Paint sky and floor, as the background of a new frame.
    pub fn clear_frame(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        self.fill_rect(0, 0, w, h / 2, self.sky_color);
        self.fill_rect(0, h / 2, w, h - h / 2, self.floor_color);
    }

    /// Copy the pixels into a 32 bits per pixel (native endian xRGB) byte buffer with the given pitch.
    pub fn copy_to(&self, out: &mut [u8], pitch: usize) {
        for (y, row) in self.pixels.chunks_exact(self.width.max(1)).enumerate() {
            let start = y * pitch;
            let Some(line) = out.get_mut(start..start + row.len() * 4) else {
                break;
            };
            for (px, dst) in row.iter().zip(line.chunks_exact_mut(4)) {
                dst.copy_from_slice(&px.to_ne_bytes());
            }
        }
    }

    /// Write the frame as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for &px in &self.pixels {
            let (r, g, b) = rgb_components(px);
            bytes.extend_from_slice(&[r, g, b]);
        }
        out.write_all(&bytes)
    }

    pub fn save_ppm<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        self.write_ppm(&mut file)?;
        file.flush()
    }
}

impl ColumnDrawer for ScreenBuffer {
    fn draw_column(&mut self, slice: &ColumnSlice) {
        let x = slice.x as i32;
        for y in slice.y_start..=slice.y_end {
            let color = self.walls.color_at(slice, y);
            self.put_pixel(x, y, color);
        }
    }
}

//-------------------
