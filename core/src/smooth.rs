use tracing::debug;

use crate::grid::HeightGrid;

/// In-place interleaved averaging blur.
///
/// Each pass runs four sweeps: odd columns, odd rows, even columns from 2,
/// even rows from 2. Every sweep writes straight into the grid, so later
/// sweeps read values the earlier ones just produced. Along each axis the
/// first and last index are only ever read.
pub struct Smoother {
    passes: usize,
}

impl Smoother {
    pub fn new(passes: usize) -> Self {
        Self { passes }
    }

    pub fn apply(&self, grid: &mut HeightGrid) {
        let n = grid.side();
        let cells = grid.rows_mut();

        for _ in 0..self.passes {
            // Horizontal
            for row in cells.iter_mut() {
                for x in (1..n.saturating_sub(1)).step_by(2) {
                    row[x] = average(row[x - 1], row[x + 1]);
                }
            }
            // Vertical
            for y in (1..n.saturating_sub(1)).step_by(2) {
                for x in 0..n {
                    cells[y][x] = average(cells[y - 1][x], cells[y + 1][x]);
                }
            }
            // Horizontal + 1
            for row in cells.iter_mut() {
                for x in (2..n.saturating_sub(1)).step_by(2) {
                    row[x] = average(row[x - 1], row[x + 1]);
                }
            }
            // Vertical + 1
            for y in (2..n.saturating_sub(1)).step_by(2) {
                for x in 0..n {
                    cells[y][x] = average(cells[y - 1][x], cells[y + 1][x]);
                }
            }
        }
        debug!(passes = self.passes, "smoothing applied");
    }
}

// Integer mean truncated toward zero; widened so extreme cells cannot overflow
#[inline]
fn average(a: i32, b: i32) -> i32 {
    ((a as i64 + b as i64) / 2) as i32
}

#[cfg(test)]
mod tests {
    use super::Smoother;
    use crate::HeightGrid;

    fn spike(side: usize, x: usize, y: usize) -> HeightGrid {
        let mut g = HeightGrid::new(side);
        g.clear(0);
        g.set(x, y, 255);
        g
    }

    #[test]
    fn odd_spike_is_erased() {
        // the first sweep overwrites (3, 3) from its zero neighbours
        let mut g = spike(8, 3, 3);
        Smoother::new(1).apply(&mut g);
        assert_eq!(g.value_range(), (0, 0));
    }

    #[test]
    fn even_spike_spreads_lopsided() {
        let mut g = spike(8, 4, 4);
        Smoother::new(1).apply(&mut g);
        let expected = vec![
            vec![0, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 15, 31, 31, 31, 15, 0],
            vec![0, 0, 31, 63, 63, 63, 31, 0],
            vec![0, 0, 31, 63, 63, 63, 31, 0],
            vec![0, 0, 31, 63, 63, 63, 31, 0],
            vec![0, 0, 15, 31, 31, 31, 15, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0],
        ];
        assert_eq!(g.rows(), expected.as_slice());
    }

    #[test]
    fn corners_are_never_written() {
        let mut g = HeightGrid::new(16);
        g.clear(0);
        g.set(0, 0, 11);
        g.set(15, 0, 22);
        g.set(0, 15, 33);
        g.set(15, 15, 44);
        Smoother::new(4).apply(&mut g);
        assert_eq!(g.get(0, 0), 11);
        assert_eq!(g.get(15, 0), 22);
        assert_eq!(g.get(0, 15), 33);
        assert_eq!(g.get(15, 15), 44);
    }

    #[test]
    fn flat_field_is_unchanged() {
        let mut g = HeightGrid::new(32);
        g.clear(90);
        let before = g.clone();
        Smoother::new(3).apply(&mut g);
        assert_eq!(g, before);
    }

    #[test]
    fn zero_passes_is_a_no_op() {
        let mut g = spike(8, 3, 3);
        let before = g.clone();
        Smoother::new(0).apply(&mut g);
        assert_eq!(g, before);
    }

    #[test]
    fn extreme_values_average_without_overflow() {
        let mut g = HeightGrid::new(4);
        g.clear(i32::MAX);
        Smoother::new(1).apply(&mut g);
        assert_eq!(g.value_range(), (i32::MAX, i32::MAX));

        g.clear(i32::MIN);
        g.set(2, 0, i32::MAX);
        Smoother::new(1).apply(&mut g);
        // (MIN + MAX) / 2 truncates to 0
        assert_eq!(g.get(1, 0), 0);
    }
}
