pub mod density;
pub mod hourly_chart;
pub mod outlier_chart;
pub mod pair_chart;

pub use hourly_chart::HourlyChart;
pub use outlier_chart::OutlierChart;
pub use pair_chart::PairChart;

use crate::engine::AnalysisSession;
use crate::error::Result;
use crate::processors::AnalysisOutcome;
use crate::utils::constants::{HOURLY_CHART_FILE, OUTLIER_CHART_FILE, PAIR_CHART_FILE};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Renders the three analysis charts.
///
/// Charts are drawn into the session scratch directory and copied to the
/// output directory only after every render succeeded.
pub struct ChartRenderer {
    output_dir: PathBuf,
    labels: bool,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            labels: true,
        }
    }

    /// Draw charts without titles or axes, for hosts with no system fonts.
    pub fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    /// Draw every chart with data behind it and return the published paths.
    pub fn render_all(
        &self,
        session: &AnalysisSession,
        outcome: &AnalysisOutcome,
    ) -> Result<Vec<PathBuf>> {
        let staging = session.scratch_dir().join("charts");
        fs::create_dir_all(&staging)?;

        let mut staged = Vec::new();

        if outcome.hourly.is_empty() {
            warn!("No trips to chart by hour, skipping {}", HOURLY_CHART_FILE);
        } else {
            let path = staging.join(HOURLY_CHART_FILE);
            let mut chart = HourlyChart::new(&outcome.hourly);
            if !self.labels {
                chart = chart.without_labels();
            }
            chart.render(&path)?;
            staged.push(path);
        }

        if outcome.outlier_sample.is_empty() {
            warn!("Outlier sample is empty, skipping {}", OUTLIER_CHART_FILE);
        } else {
            let path = staging.join(OUTLIER_CHART_FILE);
            let mut chart = OutlierChart::new(&outcome.outlier_sample);
            if !self.labels {
                chart = chart.without_labels();
            }
            chart.render(&path)?;
            staged.push(path);
        }

        if outcome.relationship_sample.is_empty() {
            warn!("Relationship sample is empty, skipping {}", PAIR_CHART_FILE);
        } else {
            let path = staging.join(PAIR_CHART_FILE);
            let mut chart = PairChart::new(&outcome.relationship_sample);
            if !self.labels {
                chart = chart.without_labels();
            }
            chart.render(&path)?;
            staged.push(path);
        }

        self.publish(&staged)
    }

    fn publish(&self, staged: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if staged.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.output_dir)?;

        let mut published = Vec::with_capacity(staged.len());
        for source in staged {
            let Some(name) = source.file_name() else {
                continue;
            };
            let target = self.output_dir.join(name);
            fs::copy(source, &target)?;
            debug!("Copied {} -> {}", source.display(), target.display());
            published.push(target);
        }

        info!(
            charts = published.len(),
            "Charts written to {}",
            self.output_dir.display()
        );
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineEnvironment;
    use crate::models::{CoordinateSample, FeatureSample, HourlyAggregate};
    use crate::processors::TripCleaner;
    use tempfile::TempDir;

    fn start_session(home: &TempDir) -> AnalysisSession {
        let env = EngineEnvironment::resolve_from(Some(home.path()), Some(Default::default())).unwrap();
        AnalysisSession::start(&env, 1).unwrap()
    }

    #[test]
    fn test_unlabelled_charts_are_staged_then_published() {
        let home = TempDir::new().unwrap();
        let session = start_session(&home);

        let mut histogram = [0u64; 24];
        histogram[9] = 3;
        let coordinates = vec![
            CoordinateSample { lat: Some(40.70), lon: Some(-74.00) },
            CoordinateSample { lat: Some(40.75), lon: Some(-73.95) },
            CoordinateSample { lat: Some(40.80), lon: None },
        ];
        let features = vec![
            FeatureSample { hour: 9, day: 1, month: 4, lat: Some(40.70), lon: Some(-74.00) },
            FeatureSample { hour: 9, day: 2, month: 5, lat: Some(40.75), lon: Some(-73.95) },
        ];
        let outcome = AnalysisOutcome {
            files: Vec::new(),
            records: Vec::new(),
            report: TripCleaner::new().unwrap().clean(&session, Vec::new()).report,
            hourly: HourlyAggregate::from_histogram(&histogram),
            outlier_sample: coordinates,
            relationship_sample: features,
        };

        let output = home.path().join("out");
        let charts = ChartRenderer::new(&output)
            .without_labels()
            .render_all(&session, &outcome)
            .unwrap();

        assert_eq!(
            charts,
            vec![
                output.join(HOURLY_CHART_FILE),
                output.join(OUTLIER_CHART_FILE),
                output.join(PAIR_CHART_FILE),
            ]
        );
        for chart in &charts {
            assert!(fs::metadata(chart).unwrap().len() > 0);
            let staged = session.scratch_dir().join("charts").join(chart.file_name().unwrap());
            assert!(staged.exists());
        }
    }

    #[test]
    fn test_empty_outcome_writes_nothing() {
        let home = TempDir::new().unwrap();
        let session = start_session(&home);

        let outcome = AnalysisOutcome {
            files: Vec::new(),
            records: Vec::new(),
            report: TripCleaner::new().unwrap().clean(&session, Vec::new()).report,
            hourly: HourlyAggregate::from_histogram(&[0; 24]),
            outlier_sample: Vec::new(),
            relationship_sample: Vec::new(),
        };

        let output = home.path().join("out");
        let charts = ChartRenderer::new(&output).render_all(&session, &outcome).unwrap();

        assert!(charts.is_empty());
        assert!(!output.exists());
    }
}
