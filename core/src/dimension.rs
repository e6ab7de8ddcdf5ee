use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::grid::HeightGrid;

/// Cubes of side `box_size` needed to cover the height-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxCount {
    pub box_size: usize,
    pub block_count: u64,
}

/// How the log-log slope is taken from the box counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeFit {
    /// Start from the first slope, then fold each following slope in with
    /// `d = (d + slope) / 2`. Early levels dominate; fine for a quick readout.
    #[default]
    RunningAverage,
    /// Ordinary least-squares line through every level.
    LeastSquares,
}

/// Box counts for sizes `N, N/2, ..., 1`.
///
/// The first level always reports one box, the one that bounds the tile.
/// Every other level sums, over each `s x s` patch, the number of
/// `s`-high cubes needed to reach one above the patch maximum.
pub fn box_count(grid: &HeightGrid) -> Vec<BoxCount> {
    let side = grid.side();
    let mut levels = Vec::new();
    let mut size = side;

    while size >= 1 {
        let block_count = if levels.is_empty() {
            1
        } else {
            let patches = side / size;
            let mut count = 0u64;
            for px in 0..patches {
                for py in 0..patches {
                    let reach = grid.patch_max_height(px * size, size, py * size, size) as i64 + 1;
                    let stack = reach / size as i64;
                    count += stack as u64;
                    if stack * (size as i64) < reach {
                        count += 1;
                    }
                }
            }
            count
        };
        debug!(box_size = size, block_count, "box count level");
        levels.push(BoxCount {
            box_size: size,
            block_count,
        });
        size /= 2;
    }
    levels
}

/// Box-counting fractal dimension estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionEstimator {
    fit: SlopeFit,
}

impl DimensionEstimator {
    pub fn new(fit: SlopeFit) -> Self {
        Self { fit }
    }

    pub fn estimate(&self, grid: &HeightGrid) -> Result<f64> {
        let counts = box_count(grid);
        if counts.len() < 2 {
            return Err(TerrainError::InsufficientData {
                levels: counts.len(),
            });
        }

        // (log10(1 / size), log10(count))
        let points: Vec<(f64, f64)> = counts
            .iter()
            .map(|c| {
                (
                    (1.0 / c.box_size as f64).log10(),
                    (c.block_count as f64).log10(),
                )
            })
            .collect();

        let dimension = match self.fit {
            SlopeFit::RunningAverage => running_average_slope(&points),
            SlopeFit::LeastSquares => least_squares_slope(&points),
        };
        debug!(fit = ?self.fit, dimension, "fractal dimension");
        Ok(dimension)
    }
}

/// Fractal dimension with the default running-average fit.
pub fn fractal_dimension(grid: &HeightGrid) -> Result<f64> {
    DimensionEstimator::default().estimate(grid)
}

fn slope(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.1 - a.1) / (b.0 - a.0)
}

fn running_average_slope(points: &[(f64, f64)]) -> f64 {
    let mut dimension = slope(points[0], points[1]);
    for pair in points[1..].windows(2) {
        dimension = (dimension + slope(pair[0], pair[1])) / 2.0;
    }
    dimension
}

fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (num, den) = points.iter().fold((0.0, 0.0), |(num, den), &(x, y)| {
        let dx = x - mean_x;
        (num + dx * (y - mean_y), den + dx * dx)
    });
    num / den
}
