use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::RandomSource;
use crate::error::{Result, TerrainError};
use crate::fault_line::{FaultLine, Side, Vec3};
use crate::grid::HeightGrid;

/// Retained heights above this value abort the run.
pub const RETENTION_CEILING: f64 = 65536.0;

/// Which number source picks the fault end points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Uniform,
    Chaotic,
}

/// How fault displacements are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulation {
    /// Apply each displacement to the grid only when the cell stays strictly
    /// inside the height bounds; otherwise drop it.
    #[default]
    Bounded,
    /// Accumulate unbounded in a floating buffer, then rescale once onto
    /// the height bounds.
    Retained,
}

/// How the per-iteration depth moves from `depth_start` to `depth_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthRamp {
    /// `start + trunc(i / n) * (end - start)`. The truncated fraction is
    /// always 0 inside a run, so every fault uses `depth_start`.
    #[default]
    Stepped,
    /// `start + floor(i * (end - start) / n)`.
    Linear,
}

/// Parameters of one fault-formation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultParams {
    pub iterations: usize,
    pub depth_start: i32,
    pub depth_end: i32,
    /// Non-zero overrides the ramp for every iteration.
    pub fixed_depth: i32,
    pub source: SourceKind,
    pub accumulation: Accumulation,
    pub ramp: DepthRamp,
}

impl Default for FaultParams {
    fn default() -> Self {
        Self {
            iterations: 512,
            depth_start: 10,
            depth_end: 1,
            fixed_depth: 0,
            source: SourceKind::Uniform,
            accumulation: Accumulation::Bounded,
            ramp: DepthRamp::Stepped,
        }
    }
}

impl FaultParams {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(TerrainError::InvalidParams(
                "iterations must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Fault depth for iteration `i` of the run.
    pub fn depth_at(&self, i: usize) -> i32 {
        if self.fixed_depth != 0 {
            return self.fixed_depth;
        }
        let start = self.depth_start as i64;
        let delta = self.depth_end as i64 - start;
        let depth = match self.ramp {
            DepthRamp::Stepped => {
                let step = (i as f32 / self.iterations as f32) as i64;
                start + step * delta
            }
            DepthRamp::Linear => start + (i as i64 * delta).div_euclid(self.iterations as i64),
        };
        // both ramps stay between depth_start and depth_end
        depth as i32
    }
}

/// Working state of the chosen accumulation strategy during one run.
enum Accumulator {
    Bounded,
    Retained(Vec<Vec<f64>>),
}

impl Accumulator {
    fn start(mode: Accumulation, grid: &HeightGrid) -> Self {
        match mode {
            Accumulation::Bounded => Accumulator::Bounded,
            Accumulation::Retained => Accumulator::Retained(
                grid.rows()
                    .iter()
                    .map(|row| row.iter().map(|&v| v as f64).collect())
                    .collect(),
            ),
        }
    }

    fn displace(&mut self, grid: &mut HeightGrid, line: &FaultLine, depth: i32) {
        match self {
            Accumulator::Bounded => {
                let (min, max) = (grid.min_height() as i64, grid.max_height() as i64);
                let depth = depth as i64;
                for (y, row) in grid.rows_mut().iter_mut().enumerate() {
                    for (x, cell) in row.iter_mut().enumerate() {
                        let current = *cell as i64;
                        let moved = match line.side_of(x, y) {
                            Side::Left => current + depth,
                            Side::Right => current - depth,
                        };
                        if bounded_step_allowed(current, moved, min, max) {
                            *cell = moved as i32;
                        }
                    }
                }
            }
            Accumulator::Retained(buffer) => {
                let depth = depth as f64;
                for (y, row) in buffer.iter_mut().enumerate() {
                    for (x, cell) in row.iter_mut().enumerate() {
                        match line.side_of(x, y) {
                            Side::Left => *cell += depth,
                            Side::Right => *cell -= depth,
                        }
                    }
                }
            }
        }
    }

    fn finish(self, grid: &mut HeightGrid) -> Result<()> {
        match self {
            Accumulator::Bounded => Ok(()),
            Accumulator::Retained(buffer) => quantize(&buffer, grid),
        }
    }
}

/// A bounded step must stay strictly inside the bound it moves toward:
/// raising needs `moved < max`, lowering needs `moved > min`.
fn bounded_step_allowed(current: i64, moved: i64, min: i64, max: i64) -> bool {
    if moved > current {
        moved < max
    } else if moved < current {
        moved > min
    } else {
        false
    }
}

/// Rescale the retention buffer from its own `[min, max]` onto the grid's
/// height bounds, truncating toward zero. A flat buffer maps to `min_height`.
/// The grid is left untouched when a value exceeds [`RETENTION_CEILING`].
fn quantize(buffer: &[Vec<f64>], grid: &mut HeightGrid) -> Result<()> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (y, row) in buffer.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            if v > RETENTION_CEILING {
                return Err(TerrainError::NumericOverflow {
                    x,
                    y,
                    value: v,
                    ceiling: RETENTION_CEILING,
                });
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }

    let min_height = grid.min_height() as i64;
    let span = (grid.max_height() as i64 - min_height) as f64;
    let range = hi - lo;
    if range == 0.0 {
        warn!(value = lo, "retention buffer is flat; quantizing to the minimum height");
    }

    for (row, src) in grid.rows_mut().iter_mut().zip(buffer) {
        for (cell, &v) in row.iter_mut().zip(src) {
            let scaled = if range == 0.0 {
                0.0
            } else {
                (v - lo) * span / range
            };
            *cell = (min_height + scaled as i64) as i32;
        }
    }
    Ok(())
}

/// Fault-line formation: repeatedly split the tile with a random line,
/// raise the left side and lower the right.
///
/// Output is reproducible only with a [`LogisticMap`](crate::LogisticMap)
/// whose seed the caller pins and resets before each run. The uniform
/// source reseeds itself from the clock at the start of every run.
pub struct FaultFormation {
    params: FaultParams,
}

impl FaultFormation {
    pub fn new(params: FaultParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &FaultParams {
        &self.params
    }

    /// Run every iteration against `grid`, drawing end points from `source`.
    /// `progress` receives the completed percentage once per iteration.
    pub fn generate<R, F>(&self, grid: &mut HeightGrid, source: &mut R, mut progress: F) -> Result<()>
    where
        R: RandomSource + ?Sized,
        F: FnMut(u32),
    {
        let p = &self.params;
        let side = grid.side();
        info!(
            iterations = p.iterations,
            depth_start = p.depth_start,
            depth_end = p.depth_end,
            fixed_depth = p.fixed_depth,
            accumulation = ?p.accumulation,
            "fault formation started"
        );

        source.begin_run();
        let mut acc = Accumulator::start(p.accumulation, grid);

        for i in 0..p.iterations {
            let x1 = source.pick(side);
            let y1 = source.pick(side);
            let x2 = source.pick(side);
            let y2 = source.pick(side);
            let line = FaultLine::new(Vec3::planar(x1, y1), Vec3::planar(x2, y2));

            acc.displace(grid, &line, p.depth_at(i));

            let percent = ((i + 1) * 100 / p.iterations) as u32;
            trace!(iteration = i, percent, "fault applied");
            progress(percent);
        }

        acc.finish(grid)?;
        info!("fault formation finished");
        Ok(())
    }
}
