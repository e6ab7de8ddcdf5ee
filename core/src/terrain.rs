use std::path::Path;

use tracing::info;

use crate::dimension::{DimensionEstimator, SlopeFit};
use crate::error::Result;
use crate::fault_formation::{FaultFormation, FaultParams, SourceKind};
use crate::grid::{HeightGrid, TILE_SIZE};
use crate::RandomSource;
use crate::random::{LogisticMap, UniformSource};
use crate::smooth::Smoother;
use crate::tga;

pub const DEFAULT_FILENAME: &str = "fractal01";

/// A terrain tile together with the number sources that shape it and the
/// name it is exported under.
///
/// The logistic map keeps its trajectory between runs; use
/// [`Terrain::chaos_mut`] to pin or reset it.
pub struct Terrain {
    grid: HeightGrid,
    chaos: LogisticMap,
    uniform: UniformSource,
    filename: String,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new(TILE_SIZE)
    }
}

impl Terrain {
    pub fn new(side: usize) -> Self {
        Self::with_chaos(side, LogisticMap::default())
    }

    /// Fallible constructor for sides that come from user input.
    pub fn try_new(side: usize) -> Result<Self> {
        let grid = HeightGrid::try_new(side)?;
        Ok(Self::from_parts(grid, LogisticMap::default(), UniformSource::new()))
    }

    pub fn with_chaos(side: usize, chaos: LogisticMap) -> Self {
        Self::from_parts(HeightGrid::new(side), chaos, UniformSource::new())
    }

    pub fn with_sources(side: usize, chaos: LogisticMap, uniform: UniformSource) -> Self {
        Self::from_parts(HeightGrid::new(side), chaos, uniform)
    }

    fn from_parts(grid: HeightGrid, chaos: LogisticMap, uniform: UniformSource) -> Self {
        Self {
            grid,
            chaos,
            uniform,
            filename: DEFAULT_FILENAME.to_string(),
        }
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut HeightGrid {
        &mut self.grid
    }

    pub fn chaos(&self) -> &LogisticMap {
        &self.chaos
    }

    pub fn chaos_mut(&mut self) -> &mut LogisticMap {
        &mut self.chaos
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub fn clear(&mut self, value: i32) {
        self.grid.clear(value);
    }

    /// Seed the logistic map with `average height / max height` and restart it.
    pub fn seed_chaos_from_height(&mut self) {
        let seed = self.grid.running_average_height() / self.grid.max_height() as f32;
        self.reseed_chaos(seed);
    }

    /// Seed the logistic map with a uniform draw in `[0, 1]` and restart it.
    pub fn seed_chaos_randomly(&mut self) {
        let seed = self.uniform.unit();
        self.reseed_chaos(seed);
    }

    fn reseed_chaos(&mut self, seed: f32) {
        self.chaos.set_seed(seed);
        self.chaos.reset();
        info!(seed, "logistic map reseeded");
    }

    /// Run fault formation with the source `params.source` selects.
    /// The uniform source is reseeded from the clock on every run, whichever
    /// source draws the fault lines.
    pub fn generate<F: FnMut(u32)>(&mut self, params: FaultParams, progress: F) -> Result<()> {
        let formation = FaultFormation::new(params)?;
        match params.source {
            SourceKind::Chaotic => {
                self.uniform.begin_run();
                formation.generate(&mut self.grid, &mut self.chaos, progress)
            }
            SourceKind::Uniform => formation.generate(&mut self.grid, &mut self.uniform, progress),
        }
    }

    pub fn fractal_dimension(&self) -> Result<f64> {
        DimensionEstimator::default().estimate(&self.grid)
    }

    pub fn fractal_dimension_with(&self, fit: SlopeFit) -> Result<f64> {
        DimensionEstimator::new(fit).estimate(&self.grid)
    }

    pub fn smooth(&mut self, passes: usize) {
        Smoother::new(passes).apply(&mut self.grid);
    }

    /// Write the tile to its filename as a TGA. No extension is added.
    pub fn save(&self) -> Result<()> {
        tga::save_tga(&self.grid, &self.filename)
    }

    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.filename = path.as_ref().to_string_lossy().into_owned();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_FILENAME, Terrain};
    use crate::{Accumulation, FaultParams, LogisticMap, SourceKind, TerrainError, UniformSource};

    fn chaotic(iterations: usize) -> FaultParams {
        FaultParams {
            iterations,
            source: SourceKind::Chaotic,
            ..FaultParams::default()
        }
    }

    #[test]
    fn new_terrain_defaults() {
        let t = Terrain::default();
        assert_eq!(t.filename(), DEFAULT_FILENAME);
        assert_eq!(t.grid().side(), 256);
        assert_eq!(t.grid().get(10, 10), 127);
        assert_eq!(*t.chaos(), LogisticMap::default());
    }

    #[test]
    fn chaos_state_carries_between_runs() {
        let mut t = Terrain::with_chaos(16, LogisticMap::new(4.0, 0.31));
        t.generate(chaotic(3), |_| {}).unwrap();
        let after_first = t.chaos().last_iterate();
        assert_ne!(after_first, 0.31);

        let mut fresh = LogisticMap::new(4.0, 0.31);
        for _ in 0..12 {
            fresh.iterate();
        }
        assert_eq!(after_first, fresh.last_iterate());

        // without a reset the second run continues the trajectory
        t.generate(chaotic(3), |_| {}).unwrap();
        for _ in 0..12 {
            fresh.iterate();
        }
        assert_eq!(t.chaos().last_iterate(), fresh.last_iterate());
    }

    #[test]
    fn chaotic_run_still_reseeds_uniform_source() {
        let pinned = || UniformSource::from_seed(1);
        let mut idle = Terrain::with_sources(8, LogisticMap::new(4.0, 0.31), pinned());
        let mut ran = Terrain::with_sources(8, LogisticMap::new(4.0, 0.31), pinned());
        ran.generate(chaotic(1), |_| {}).unwrap();

        idle.seed_chaos_randomly();
        ran.seed_chaos_randomly();
        assert_ne!(idle.chaos().seed(), ran.chaos().seed());
    }

    #[test]
    fn zero_side_terrain_is_an_error() {
        assert!(matches!(
            Terrain::try_new(0),
            Err(TerrainError::InvalidParams(_))
        ));
        assert_eq!(Terrain::try_new(16).unwrap().grid().side(), 16);
    }

    #[test]
    fn seed_from_height_uses_average_over_max() {
        let mut t = Terrain::new(8);
        t.clear(51);
        t.seed_chaos_from_height();
        assert!((t.chaos().seed() - 0.2).abs() < 1e-6);
        assert_eq!(t.chaos().last_iterate(), t.chaos().seed());
    }

    #[test]
    fn random_chaos_seed_is_a_unit_value() {
        let mut t = Terrain::new(8);
        t.seed_chaos_randomly();
        let s = t.chaos().seed();
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn uniform_generation_respects_bounds() {
        let mut t = Terrain::new(32);
        let params = FaultParams {
            iterations: 200,
            ..FaultParams::default()
        };
        t.generate(params, |_| {}).unwrap();
        let (lo, hi) = t.grid().value_range();
        assert!(lo >= 0 && hi <= 255);
    }

    #[test]
    fn retained_generation_fills_bounds() {
        let mut t = Terrain::with_chaos(32, LogisticMap::new(4.0, 0.6180));
        let params = FaultParams {
            accumulation: Accumulation::Retained,
            ..chaotic(40)
        };
        t.generate(params, |_| {}).unwrap();
        assert_eq!(t.grid().value_range(), (0, 255));
    }
}
