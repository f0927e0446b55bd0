//! Projector - turns the camera's view of the grid into one vertical wall slice per screen column.

use rayon::prelude::*;

use crate::*;

/// One vertical run of pixels, as handed to the [`ColumnDrawer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSlice {
    /// Screen column.
    pub x: usize,
    /// First and last visible row, both inclusive and already clipped to the screen.
    pub y_start: i32,
    pub y_end: i32,
    /// Unclipped height of the slice, in pixels.
    pub line_height: i32,
    pub side: Side,
    pub cell_code: u8,
    /// Horizontal texture range (one texel wide).
    pub tex_u0: f64,
    pub tex_u1: f64,
    /// Vertical texture range, reduced when the slice is clipped by the screen.
    pub tex_v0: f64,
    pub tex_v1: f64,
    pub perp_dist: f64,
    pub hit: Vector2,
}

/// Drawing backend, called once per screen column that shows a wall.
/// Columns where the ray leaves the grid are transparent and are not drawn.
pub trait ColumnDrawer {
    fn draw_column(&mut self, slice: &ColumnSlice);
}

/// Collects the slices instead of drawing them.
impl ColumnDrawer for Vec<ColumnSlice> {
    #[inline]
    fn draw_column(&mut self, slice: &ColumnSlice) {
        self.push(*slice);
    }
}

pub struct Projector {
    width: usize,
    height: usize,
    tex_width: f64,
    tex_height: f64,
    caster: RayCaster,
    arena: Vec2Arena,
    ray_dirs: Vec<Vector2>,
}

impl Projector {
    pub fn new(width: usize, height: usize, caster: RayCaster) -> Self {
        Self {
            width,
            height,
            tex_width: TEX_WIDTH as f64,
            tex_height: TEX_HEIGHT as f64,
            caster,
            arena: Vec2Arena::with_capacity(16),
            ray_dirs: Vec::with_capacity(width),
        }
    }

    /// Texture size used for the texture coordinates (at least 1x1).
    pub fn with_texture_size(mut self, tex_width: usize, tex_height: usize) -> Self {
        self.tex_width = tex_width.max(1) as f64;
        self.tex_height = tex_height.max(1) as f64;
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
    pub fn caster(&self) -> &RayCaster {
        &self.caster
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Project the whole frame. Returns the number of columns drawn.
    #[inline]
    pub fn render(&mut self, cam: &CameraState, map: &GridMap, drawer: &mut dyn ColumnDrawer) -> usize {
        self.render_with(cam, map, drawer, None, None)
    }

    /// Like `render()`, also filling the optional depth buffer (perpendicular distance per column,
    /// `f64::INFINITY` where nothing was hit) and appending each hit position to the optional trace.
    pub fn render_with(
        &mut self,
        cam: &CameraState,
        map: &GridMap,
        drawer: &mut dyn ColumnDrawer,
        mut depth: Option<&mut [f64]>,
        mut trace: Option<&mut Vec<Vector2>>,
    ) -> usize {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        self.compute_ray_dirs(cam.pos(), cam.dir(), cam.plane());

        // the columns are independent, so they are cast in parallel ...
        let pos = cam.pos();
        let plane = cam.plane();
        let slices: Vec<Option<ColumnSlice>> = self
            .ray_dirs
            .par_iter()
            .enumerate()
            .map(|(x, &ray_dir)| self.project_column(x, pos, plane, ray_dir, map))
            .collect();

        // ... but drawn in order, by a single drawer
        let mut drawn = 0;
        for (x, slice) in slices.iter().enumerate() {
            if let Some(d) = depth.as_deref_mut().and_then(|d| d.get_mut(x)) {
                *d = slice.map_or(f64::INFINITY, |s| s.perp_dist);
            }
            if let Some(s) = slice {
                if let Some(t) = trace.as_deref_mut() {
                    t.push(s.hit);
                }
                drawer.draw_column(s);
                drawn += 1;
            }
        }
        drawn
    }

    //----------------
    //  Internal stuff

    /// Walk the near clipping plane, from `pos + dir - plane` to `pos + dir + plane`,
    /// one stride per screen column.
    fn compute_ray_dirs(&mut self, pos: Vector2, dir: Vector2, plane: Vector2) {
        let a = &mut self.arena;
        a.clear();
        let p = a.put(pos);
        let d = a.put(dir);
        let n = a.put(plane);
        let ahead = a.add(p, d);
        let ncp_from = a.sub(ahead, n);
        let ncp_to = a.add(ahead, n);
        let span = a.sub(ncp_to, ncp_from);
        let stride = a.scaled(span, 1.0 / self.width as f64);

        self.ray_dirs.clear();
        let mark = a.mark();
        for x in 0..self.width {
            let offs = a.scaled(stride, x as f64);
            let on_plane = a.add(ncp_from, offs);
            let ray = a.sub(on_plane, p);
            let ray = a.normalized(ray);
            self.ray_dirs.push(a.get(ray));
            a.reset_to(mark);
        }
    }

    fn project_column(&self, x: usize, pos: Vector2, plane: Vector2, ray_dir: Vector2, map: &GridMap) -> Option<ColumnSlice> {
        let hit = self.caster.cast_on(map, pos, ray_dir)?;

        // distance to the camera plane, NOT to the camera (that would give a fisheye effect)
        let perp_dist = hit.pos.perp_dist_to_line(pos, plane);
        let h = self.height as i32;
        // saturates for a zero distance
        let line_height = (self.height as f64 / perp_dist) as i32;

        let mut y_start = h / 2 - line_height / 2;
        let mut y_end = h / 2 + line_height / 2;
        let mut factor_start = 0.0;
        let mut factor_end = 1.0;
        if y_start < 0 {
            factor_start = -y_start as f64 / line_height as f64;
            y_start = 0;
        }
        if y_end >= h {
            factor_end = 1.0 - (y_end - (h - 1)) as f64 / line_height as f64;
            y_end = h - 1;
        }

        let (col, row) = hit.cell;
        let u = match hit.side {
            Side::Hor => (hit.pos.x() - col as f64).abs(),
            // flipped, so that textures are not mirrored
            Side::Ver => 1.0 - (hit.pos.y() - row as f64).abs(),
        };
        let tex_u0 = (u * self.tex_width).clamp(0.0, self.tex_width - 1.0);

        Some(ColumnSlice {
            x,
            y_start,
            y_end,
            line_height,
            side: hit.side,
            cell_code: map.cell(col, row).unwrap_or(OUTER_WALL),
            tex_u0,
            tex_u1: tex_u0 + 1.0,
            tex_v0: lerp(0.0, self.tex_height, factor_start),
            tex_v1: lerp(0.0, self.tex_height, factor_end),
            perp_dist,
            hit: hit.pos,
        })
    }
}

//-------------------
