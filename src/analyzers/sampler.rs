use crate::models::TripRecord;
use crate::utils::constants::{DEFAULT_SAMPLE_FRACTION, DEFAULT_SAMPLE_SEED};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Seeded Bernoulli sampler: each row is kept independently with
/// probability `fraction`.
///
/// Rows are visited in dataset order, so the same input, seed, fraction
/// and stream always select the same rows. Different streams give
/// independent draws from the same seed; stream 0 uses the seed as is.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    fraction: f64,
    seed: u64,
}

impl Sampler {
    /// `fraction` is clamped to [0, 1]; NaN samples nothing.
    pub fn new(fraction: f64, seed: u64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self { fraction, seed }
    }

    /// Draw one sample and project the kept rows.
    pub fn draw<T, F>(&self, records: &[TripRecord], stream: u64, project: F) -> Vec<T>
    where
        F: Fn(&TripRecord) -> T,
    {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(stream));

        let sample: Vec<T> = records
            .iter()
            .filter(|_| rng.gen::<f64>() < self.fraction)
            .map(project)
            .collect();

        debug!(
            stream,
            population = records.len(),
            sampled = sample.len(),
            "drew sample"
        );
        sample
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_FRACTION, DEFAULT_SAMPLE_SEED)
    }
}
