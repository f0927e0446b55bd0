//! GridMap - the immutable 2D occupancy grid, and the loader for text maps.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::Vector2;

// cell codes -> 0 is free space, everything else is some kind of wall
pub const SPACE: u8 = 0;
pub const OUTER_WALL: u8 = 1;
pub const PILLAR: u8 = 2;
pub const HOUSE_WALL: u8 = 3;
pub const COTTAGE_WALL: u8 = 4;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("the map has no cells")]
    Empty,
    #[error("map row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("invalid cell '{ch}' at line {line}, column {col}")]
    InvalidCell { line: usize, col: usize, ch: char },
    #[error("spawn cell ({col},{row}) is outside the {width}x{height} map")]
    SpawnOutOfBounds { col: i32, row: i32, width: usize, height: usize },
    #[error("spawn cell ({col},{row}) is a wall")]
    BlockedSpawn { col: i32, row: i32 },
    #[error("cannot read map file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Rectangular grid of cell codes, stored row by row.
/// It is never modified after construction, so it can be shared freely between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl GridMap {
    /// Build a map from its rows. All rows must have the same (non-zero) length.
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }

        Ok(Self { width, height, cells })
    }

    /// Parse a text map: one line per row, one digit per cell.
    /// Blank lines and lines starting with '#' are skipped.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (lineidx, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut row = Vec::with_capacity(line.len());
            for (colidx, ch) in line.chars().enumerate() {
                let code = ch.to_digit(10).ok_or(GridError::InvalidCell {
                    line: lineidx + 1,
                    col: colidx + 1,
                    ch,
                })?;
                row.push(code as u8);
            }
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let map = Self::parse(&text)?;
        info!(path = %path.display(), width = map.width, height = map.height, "map loaded");
        Ok(map)
    }

    /// The built-in 24x24 demo map.
    pub fn demo() -> Self {
        let cells = DEMO_MAP.iter().flat_map(|row| row.iter().copied()).collect();
        Self {
            width: DEMO_MAP[0].len(),
            height: DEMO_MAP.len(),
            cells,
        }
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
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    #[inline]
    pub fn cell(&self, col: i32, row: i32) -> Option<u8> {
        if self.in_bounds(col, row) {
            Some(self.cells[(row as usize) * self.width + (col as usize)])
        } else {
            None
        }
    }

    /// Anything outside the map counts as a wall.
    #[inline]
    pub fn is_wall(&self, col: i32, row: i32) -> bool {
        self.cell(col, row).map_or(true, |c| c != SPACE)
    }

    #[inline]
    pub fn is_open(&self, col: i32, row: i32) -> bool {
        !self.is_wall(col, row)
    }

    /// The centre of a free cell, where a camera can be placed.
    pub fn spawn_point(&self, col: i32, row: i32) -> Result<Vector2, GridError> {
        if !self.in_bounds(col, row) {
            return Err(GridError::SpawnOutOfBounds {
                col,
                row,
                width: self.width,
                height: self.height,
            });
        }
        if self.is_wall(col, row) {
            return Err(GridError::BlockedSpawn { col, row });
        }
        Ok(Vector2::new(col as f64 + 0.5, row as f64 + 0.5))
    }

    /// The geometrical centre of the map.
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

//-------------------
//  Internal stuff

#[rustfmt::skip]
const DEMO_MAP: [[u8; 24]; 24] = [
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,3,3,3,3,3,0,0,0,0,5,0,6,0,7,0,0,0,1],
    [1,0,0,0,0,0,3,0,0,0,3,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,3,0,0,0,3,0,0,0,0,8,0,0,0,9,0,0,0,1],
    [1,0,0,0,0,0,3,0,0,0,3,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,3,3,0,3,3,0,0,0,0,5,0,6,0,7,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,4,4,4,4,4,4,4,4,0,0,0,0,0,0,0,0,0,2,0,0,2,0,1],
    [1,4,0,4,0,0,0,0,4,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,4,0,0,0,0,5,0,4,0,0,0,0,0,0,0,0,0,2,0,0,2,0,1],
    [1,4,0,4,0,0,0,0,4,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,4,0,4,4,4,4,4,4,0,0,0,0,0,0,0,0,0,2,0,0,2,0,1],
    [1,4,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,4,4,4,4,4,4,4,4,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
];

//-------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = GridMap::new(vec![vec![1, 1, 1], vec![1, 0], vec![1, 1, 1]]).unwrap_err();
        match err {
            GridError::Ragged { row, expected, found } => {
                assert_eq!((row, expected, found), (1, 3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_map_is_rejected() {
        assert!(matches!(GridMap::new(vec![]), Err(GridError::Empty)));
        assert!(matches!(GridMap::new(vec![vec![]]), Err(GridError::Empty)));
        assert!(matches!(GridMap::parse("# nothing here\n\n"), Err(GridError::Empty)));
    }

    #[test]
    fn parse_text_map() {
        let map = GridMap::parse("# a tiny room\n111\n101\n111\n").unwrap();
        assert_eq!((map.width(), map.height()), (3, 3));
        assert!(map.is_open(1, 1));
        assert!(map.is_wall(0, 1));
        assert_eq!(map.cell(2, 2), Some(OUTER_WALL));
    }

    #[test]
    fn parse_reports_bad_cell_position() {
        let err = GridMap::parse("111\n1x1\n111").unwrap_err();
        assert!(matches!(err, GridError::InvalidCell { line: 2, col: 2, ch: 'x' }));
    }

    #[test]
    fn outside_counts_as_wall() {
        let map = GridMap::parse("00\n00").unwrap();
        assert!(map.is_open(0, 0));
        assert!(map.is_wall(-1, 0));
        assert!(map.is_wall(2, 0));
        assert!(map.is_wall(0, 2));
        assert_eq!(map.cell(5, 5), None);
    }

    #[test]
    fn spawn_point_checks_cell() {
        let map = GridMap::parse("111\n101\n111").unwrap();
        assert_eq!(map.spawn_point(1, 1).unwrap(), Vector2::new(1.5, 1.5));
        assert!(matches!(map.spawn_point(0, 0), Err(GridError::BlockedSpawn { .. })));
        assert!(matches!(map.spawn_point(3, 1), Err(GridError::SpawnOutOfBounds { .. })));
    }

    #[test]
    fn demo_map_is_closed_and_centre_is_free() {
        let map = GridMap::demo();
        assert_eq!((map.width(), map.height()), (24, 24));
        for i in 0..24 {
            assert!(map.is_wall(i, 0) && map.is_wall(i, 23));
            assert!(map.is_wall(0, i) && map.is_wall(23, i));
        }
        let (cx, cy) = map.center().cell();
        assert!(map.is_open(cx, cy));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GridMap::load("/definitely/not/here.map").unwrap_err();
        assert!(matches!(err, GridError::Io { .. }));
    }
}
