// core holds the fault-formation generator, box-counting and smoothing
pub mod dimension;
pub mod error;
pub mod fault_formation;
pub mod fault_line;
pub mod grid;
pub mod preview;
pub mod random;
pub mod smooth;
pub mod terrain;
pub mod tga;

pub use dimension::{BoxCount, DimensionEstimator, SlopeFit, box_count, fractal_dimension};
pub use error::{Result, TerrainError};
pub use fault_formation::{Accumulation, DepthRamp, FaultFormation, FaultParams, SourceKind};
pub use fault_line::{FaultLine, Side, Vec3};
pub use grid::{HeightGrid, TILE_SIZE};
pub use random::{LogisticMap, UniformSource};
pub use smooth::Smoother;
pub use terrain::{DEFAULT_FILENAME, Terrain};

// source of fault end points
// `pick(span)` returns a coordinate in [0, span - 1].
// `begin_run` is called once before every generation run.
pub trait RandomSource {
    fn pick(&mut self, span: usize) -> f32;

    fn begin_run(&mut self) {}
}
