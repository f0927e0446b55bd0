//! FloorCaster - textured floor and ceiling, painted row by row behind the walls.
//! Each screen row below the horizon looks at one floor line; the line is walked
//! from the left edge of the view to the right edge, and the grid position of
//! every pixel picks the texel. The ceiling mirrors the floor.

use rayon::prelude::*;

use crate::*;

pub struct FloorCaster {
    floor: Texture,
    ceiling: Texture,
}

impl FloorCaster {
    pub fn new(floor: Texture, ceiling: Texture) -> Self {
        Self { floor, ceiling }
    }

    /// XOR gray floor, blue gradient ceiling.
    pub fn standard(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let floor = Texture::generate(TexturePattern::XorGray, TEX_WIDTH, TEX_HEIGHT, &mut rng);
        let ceiling = Texture::from_fn(TEX_WIDTH, TEX_HEIGHT, |_, y| {
            let b = 0x60 + (y * 0x9F / TEX_HEIGHT) as u8;
            rgb(b / 4, b / 3, b)
        });
        Self::new(floor, ceiling)
    }

    /// Paint the whole screen with floor (lower half) and ceiling (upper half).
    /// Rows close to the horizon are darker.
    pub fn render(&self, cam: &CameraState, screen: &mut ScreenBuffer) {
        let (w, h) = (screen.width(), screen.height());
        if w == 0 || h == 0 {
            return;
        }
        let view = RowView {
            pos: cam.pos(),
            dir: cam.dir(),
            plane: cam.plane(),
            half: h / 2,
            eye_height: 0.5 * h as f64,
        };

        screen
            .pixels_mut()
            .par_chunks_mut(w)
            .enumerate()
            .for_each_init(
                || Vec2Arena::with_capacity(16),
                |arena, (y, row)| {
                    if y < view.half {
                        // rows above the horizon, counted upwards
                        let p = (view.half - y) as f64 - 0.5;
                        paint_row(arena, row, &view, p, &self.ceiling);
                    } else {
                        let p = (y - view.half) as f64 + 0.5;
                        paint_row(arena, row, &view, p, &self.floor);
                    }
                },
            );
    }
}

//----------------------
//  Internal stuff

struct RowView {
    pos: Vector2,
    dir: Vector2,
    plane: Vector2,
    half: usize,
    eye_height: f64,
}

/// Paint one row, `p` pixels away from the horizon.
fn paint_row(arena: &mut Vec2Arena, row: &mut [u32], view: &RowView, p: f64, tex: &Texture) {
    arena.clear();
    let row_dist = view.eye_height / p;
    let brightness = if view.half == 0 { 1.0 } else { (p / view.half as f64).min(1.0) };

    let pos = arena.put(view.pos);
    let dir = arena.put(view.dir);
    let plane = arena.put(view.plane);
    let left = arena.sub(dir, plane);
    let right = arena.add(dir, plane);
    let left = arena.scaled(left, row_dist);
    let right = arena.scaled(right, row_dist);
    let start = arena.add(pos, left);
    let end = arena.add(pos, right);
    let span = arena.sub(end, start);
    let (tw, th) = tex.size();
    let tex_size = arena.c(tw as f64, th as f64);

    let w = row.len() as f64;
    let mark = arena.mark();
    for (x, px) in row.iter_mut().enumerate() {
        let offset = arena.scaled(span, x as f64 / w);
        let sample = arena.add(start, offset);
        let in_cell = arena.fract(sample);
        let coords = arena.mul(in_cell, tex_size);
        let t = arena.get(coords);
        *px = shade(tex.sample(t.x(), t.y()), brightness);
        arena.reset_to(mark);
    }
}

//-----------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MARK: u32 = rgb(200, 100, 50);

    /// Camera at (2.5, 3.5) looking up the screen (-y).
    fn cam() -> CameraState {
        CameraState::new(Vector2::new(2.5, 3.5))
    }

    fn banded(row: usize) -> Texture {
        Texture::from_fn(TEX_WIDTH, TEX_HEIGHT, |_, y| if y == row { MARK } else { 0 })
    }

    #[test]
    fn straight_ahead_samples_the_cell_under_the_view() {
        // bottom row: p = 49.5, so the row is 50 / 49.5 away, at y = 3.5 - 1.0101 = 2.4899
        // and the texel row is floor(0.4899 * 64) = 31; the ceiling mirrors it on row 0
        let fc = FloorCaster::new(banded(31), banded(31));
        let mut screen = ScreenBuffer::new(40, 100);
        fc.render(&cam(), &mut screen);

        let expected = shade(MARK, 49.5 / 50.0);
        assert_eq!(screen.get_pixel(20, 99), Some(expected));
        assert_eq!(screen.get_pixel(20, 0), Some(expected));
    }

    #[test]
    fn rows_near_the_horizon_are_darker() {
        let white = Texture::from_fn(4, 4, |_, _| rgb(0xFF, 0xFF, 0xFF));
        let fc = FloorCaster::new(white.clone(), white);
        let mut screen = ScreenBuffer::new(16, 60);
        fc.render(&cam(), &mut screen);

        let red = |y| rgb_components(screen.get_pixel(8, y).unwrap()).0;
        assert!(red(30) < red(45));
        assert!(red(45) < red(59));
        assert!(red(29) < red(15));
        assert!(red(15) < red(0));
        assert_eq!(red(59), red(0));
    }

    #[test]
    fn every_pixel_is_painted() {
        let fc = FloorCaster::standard(7);
        let mut screen = ScreenBuffer::new(33, 21).with_colors(1, 1);
        screen.clear_frame();
        fc.render(&cam().with_view(Vector2::new(0.6, 0.8), Vector2::new(-0.528, 0.396)), &mut screen);
        assert!(screen.pixels().iter().all(|&p| p != 1));
    }

    #[test]
    fn empty_screen_is_fine() {
        let mut screen = ScreenBuffer::new(0, 10);
        FloorCaster::standard(0).render(&cam(), &mut screen);
        assert!(screen.pixels().is_empty());
    }
}
