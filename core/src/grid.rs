use crate::error::{Result, TerrainError};

/// Side length of a terrain tile.
pub const TILE_SIZE: usize = 256;
pub const DEFAULT_MIN_HEIGHT: i32 = 0;
pub const DEFAULT_MAX_HEIGHT: i32 = 255;

/// Square height-field of integer cells, row-major: `cells[y][x]`.
///
/// Mutation through the generator keeps every cell inside
/// `[min_height, max_height]`. `clear` and `set` do not clamp, and moving the
/// bounds never re-clamps cells that are already stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightGrid {
    side: usize,
    min_height: i32,
    max_height: i32,
    cells: Vec<Vec<i32>>,
}

impl Default for HeightGrid {
    fn default() -> Self {
        Self::new(TILE_SIZE)
    }
}

impl HeightGrid {
    /// New tile filled with the midpoint of the default bounds.
    pub fn new(side: usize) -> Self {
        assert!(side >= 1, "tile side must be at least 1");
        let mid = DEFAULT_MIN_HEIGHT + (DEFAULT_MAX_HEIGHT - DEFAULT_MIN_HEIGHT) / 2;
        Self {
            side,
            min_height: DEFAULT_MIN_HEIGHT,
            max_height: DEFAULT_MAX_HEIGHT,
            cells: vec![vec![mid; side]; side],
        }
    }

    /// Like [`HeightGrid::new`], but reports a zero side as an error.
    pub fn try_new(side: usize) -> Result<Self> {
        if side == 0 {
            return Err(TerrainError::InvalidParams(
                "tile side must be at least 1".into(),
            ));
        }
        Ok(Self::new(side))
    }

    /// Build a grid from rows (`rows[y][x]`). Every row must be `rows.len()` long.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Self {
        let side = rows.len();
        assert!(side >= 1, "tile side must be at least 1");
        assert!(
            rows.iter().all(|row| row.len() == side),
            "height grid must be square"
        );
        Self {
            side,
            min_height: DEFAULT_MIN_HEIGHT,
            max_height: DEFAULT_MAX_HEIGHT,
            cells: rows,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn min_height(&self) -> i32 {
        self.min_height
    }

    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    pub fn set_min_height(&mut self, min_height: i32) {
        self.min_height = min_height;
    }

    pub fn set_max_height(&mut self, max_height: i32) {
        self.max_height = max_height;
    }

    /// Fill every cell with `value`. The value is not clamped.
    pub fn clear(&mut self, value: i32) {
        for row in self.cells.iter_mut() {
            row.fill(value);
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.assert_in_bounds(x, y);
        self.cells[y][x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: i32) {
        self.assert_in_bounds(x, y);
        self.cells[y][x] = value;
    }

    pub fn checked_get(&self, x: usize, y: usize) -> Result<i32> {
        self.check_bounds(x, y)?;
        Ok(self.cells[y][x])
    }

    pub fn checked_set(&mut self, x: usize, y: usize, value: i32) -> Result<()> {
        self.check_bounds(x, y)?;
        self.cells[y][x] = value;
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<i32>] {
        &self.cells
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<i32>] {
        &mut self.cells
    }

    /// Lowest and highest stored cell.
    pub fn value_range(&self) -> (i32, i32) {
        self.cells
            .iter()
            .flatten()
            .fold((i32::MAX, i32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Greatest height inside the patch starting at (`x0`, `y0`).
    /// Heights below zero count as zero.
    pub fn patch_max_height(&self, x0: usize, width: usize, y0: usize, height: usize) -> i32 {
        let mut max = 0i32;
        for row in &self.cells[y0..y0 + height] {
            for &v in &row[x0..x0 + width] {
                max = max.max(v);
            }
        }
        max
    }

    /// Pairwise running average over the tile, columns outer and rows inner,
    /// truncating after every step. Later cells weigh far more than early ones.
    pub fn running_average_height(&self) -> f32 {
        let mut avg = self.cells[0][0] as i64;
        for x in 0..self.side {
            for y in 0..self.side {
                avg = ((avg + self.cells[y][x] as i64) as f32 / 2.0) as i64;
            }
        }
        avg as f32
    }

    fn assert_in_bounds(&self, x: usize, y: usize) {
        assert!(
            x < self.side && y < self.side,
            "grid coordinate ({x}, {y}) is outside a {side}x{side} tile",
            side = self.side
        );
    }

    fn check_bounds(&self, x: usize, y: usize) -> Result<()> {
        if x < self.side && y < self.side {
            Ok(())
        } else {
            Err(TerrainError::IndexOutOfBounds {
                x,
                y,
                side: self.side,
            })
        }
    }
}
