use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_DATA_DIR, DEFAULT_INPUT_FILES, DEFAULT_PREVIEW_ROWS, DEFAULT_SAMPLE_FRACTION,
    DEFAULT_SAMPLE_SEED,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// What happens to a record whose timestamp parsed but whose latitude or
/// longitude did not cast to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinatePolicy {
    /// Keep the record with a null coordinate; it still counts toward the
    /// hourly aggregate and is skipped by coordinate charts.
    #[default]
    Retain,
    /// Remove the record from the cleaned set.
    Drop,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalysisConfig {
    #[validate(length(min = 1))]
    pub inputs: Vec<PathBuf>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub sample_fraction: f64,

    pub sample_seed: u64,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub coordinate_policy: CoordinatePolicy,

    pub preview_rows: usize,

    pub use_mmap: bool,
}

impl AnalysisConfig {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            sample_fraction: DEFAULT_SAMPLE_FRACTION,
            sample_seed: DEFAULT_SAMPLE_SEED,
            max_workers: num_cpus::get(),
            coordinate_policy: CoordinatePolicy::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            use_mmap: false,
        }
    }

    /// The six monthly trip logs under `data_dir`.
    pub fn default_inputs(data_dir: &Path) -> Vec<PathBuf> {
        DEFAULT_INPUT_FILES
            .iter()
            .map(|name| data_dir.join(name))
            .collect()
    }

    pub fn with_sample_fraction(mut self, sample_fraction: f64) -> Self {
        self.sample_fraction = sample_fraction;
        self
    }

    pub fn with_sample_seed(mut self, sample_seed: u64) -> Self {
        self.sample_seed = sample_seed;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_coordinate_policy(mut self, coordinate_policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = coordinate_policy;
        self
    }

    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Validate and hand back the config, ready for a pipeline run.
    pub fn validated(self) -> Result<Self> {
        // NaN slips through the range check
        if !self.sample_fraction.is_finite() {
            return Err(ProcessingError::Config(format!(
                "sample fraction must be a number in [0, 1], got {}",
                self.sample_fraction
            )));
        }
        self.validate()?;
        Ok(self)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(Self::default_inputs(Path::new(DEFAULT_DATA_DIR)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_fixed_run_parameters() {
        let config = AnalysisConfig::default();

        assert_eq!(config.inputs.len(), 6);
        assert!(config.inputs[0].ends_with("uber-raw-data-apr14.csv"));
        assert!(config.inputs[5].ends_with("uber-raw-data-sep14.csv"));
        assert_eq!(config.sample_fraction, 0.01);
        assert_eq!(config.sample_seed, 42);
        assert_eq!(config.coordinate_policy, CoordinatePolicy::Retain);
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let config = AnalysisConfig::default().with_sample_fraction(1.5);
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_non_finite_fraction_rejected() {
        for fraction in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = AnalysisConfig::default().with_sample_fraction(fraction).validated();
            assert!(matches!(result, Err(ProcessingError::Config(_))), "{} accepted", fraction);
        }
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let config = AnalysisConfig::new(Vec::new());
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = AnalysisConfig::default().with_max_workers(0);
        assert!(config.validated().is_err());
    }
}
