use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::RandomSource;

pub const DEFAULT_GROWTH_RATE: f32 = 4.0;
pub const DEFAULT_CHAOS_SEED: f32 = 0.5;

/// Logistic map `x' = r * x * (1 - x)` used as a chaotic number source.
///
/// The running iterate survives between generation runs; only `reset`
/// puts it back to the seed. With `r = 4` the map is chaotic but the
/// default seed of 0.5 collapses straight onto the fixed point 0
/// (0.5 -> 1 -> 0 -> 0 ...), so callers normally pick a seed first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticMap {
    growth_rate: f32,
    seed: f32,
    last_iterate: f32,
}

impl Default for LogisticMap {
    fn default() -> Self {
        Self::new(DEFAULT_GROWTH_RATE, DEFAULT_CHAOS_SEED)
    }
}

impl LogisticMap {
    pub fn new(growth_rate: f32, seed: f32) -> Self {
        Self {
            growth_rate,
            seed,
            last_iterate: seed,
        }
    }

    /// Advance the map and return the new iterate.
    pub fn iterate(&mut self) -> f32 {
        self.last_iterate = (self.growth_rate * self.last_iterate) * (1.0 - self.last_iterate);
        self.last_iterate
    }

    /// Restart the trajectory from the seed.
    pub fn reset(&mut self) {
        self.last_iterate = self.seed;
    }

    pub fn seed(&self) -> f32 {
        self.seed
    }

    /// Change the seed. Takes effect on the next `reset`.
    pub fn set_seed(&mut self, seed: f32) {
        self.seed = seed;
    }

    pub fn growth_rate(&self) -> f32 {
        self.growth_rate
    }

    pub fn set_growth_rate(&mut self, growth_rate: f32) {
        self.growth_rate = growth_rate;
    }

    pub fn last_iterate(&self) -> f32 {
        self.last_iterate
    }
}

impl RandomSource for LogisticMap {
    fn pick(&mut self, span: usize) -> f32 {
        self.iterate() * (span as f32 - 1.0)
    }
}

/// Uniform integer source, reseeded from the wall clock (whole seconds)
/// at construction and at the start of every generation run.
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: StdRng,
}

impl Default for UniformSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSource {
    pub fn new() -> Self {
        Self::from_seed(clock_seed())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn reseed_from_clock(&mut self) {
        self.rng = StdRng::seed_from_u64(clock_seed());
    }

    /// Uniform value in `[0, 1]`.
    pub fn unit(&mut self) -> f32 {
        self.rng.gen_range(0.0..=1.0)
    }
}

impl RandomSource for UniformSource {
    fn pick(&mut self, span: usize) -> f32 {
        self.rng.gen_range(0..span.max(1)) as f32
    }

    fn begin_run(&mut self) {
        self.reseed_from_clock();
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{LogisticMap, UniformSource};
    use crate::RandomSource;

    #[test]
    fn logistic_default_seed_collapses() {
        let mut m = LogisticMap::default();
        assert_eq!(m.iterate(), 1.0);
        assert_eq!(m.iterate(), 0.0);
        assert_eq!(m.iterate(), 0.0);
    }

    #[test]
    fn logistic_follows_recurrence() {
        let mut m = LogisticMap::new(4.0, 0.3);
        let a = m.iterate();
        assert!((a - 0.84).abs() < 1e-6);
        let b = m.iterate();
        assert!((b - 4.0 * 0.84 * 0.16).abs() < 1e-5);
    }

    #[test]
    fn logistic_reset_restores_seed() {
        let mut m = LogisticMap::new(3.9, 0.21);
        let first = m.iterate();
        m.iterate();
        m.iterate();
        m.reset();
        assert_eq!(m.last_iterate(), 0.21);
        assert_eq!(m.iterate(), first);
    }

    #[test]
    fn logistic_seed_change_waits_for_reset() {
        let mut m = LogisticMap::new(4.0, 0.3);
        m.set_seed(0.7);
        assert_eq!(m.last_iterate(), 0.3);
        m.reset();
        assert_eq!(m.last_iterate(), 0.7);
    }

    #[test]
    fn logistic_pick_stays_in_span() {
        let mut m = LogisticMap::new(4.0, 0.123);
        for _ in 0..1000 {
            let v = m.pick(256);
            assert!((0.0..=255.0).contains(&v), "pick {v} out of range");
        }
    }

    #[test]
    fn uniform_pick_is_integral_and_in_span() {
        let mut u = UniformSource::from_seed(7);
        for _ in 0..1000 {
            let v = u.pick(256);
            assert_eq!(v.fract(), 0.0);
            assert!((0.0..=255.0).contains(&v));
        }
    }

    #[test]
    fn uniform_unit_range() {
        let mut u = UniformSource::from_seed(11);
        for _ in 0..100 {
            let v = u.unit();
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
