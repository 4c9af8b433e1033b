use crate::analyzers::{HourlyAggregator, Sampler};
use crate::config::AnalysisConfig;
use crate::engine::AnalysisSession;
use crate::error::Result;
use crate::models::{CoordinateSample, FeatureSample, HourlyAggregate, TripRecord};
use crate::processors::{CleanedData, CleaningReport, TripCleaner};
use crate::readers::{ConcurrentReader, FileSummary, IngestedData};
use crate::utils::constants::{OUTLIER_SAMPLE_STREAM, RELATIONSHIP_SAMPLE_STREAM};
use crate::utils::progress::ProgressReporter;
use crate::visualization::ChartRenderer;
use std::path::PathBuf;
use tracing::info;

/// Everything the charts and reports consume from one run.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub files: Vec<FileSummary>,
    pub records: Vec<TripRecord>,
    pub report: CleaningReport,
    pub hourly: HourlyAggregate,
    pub outlier_sample: Vec<CoordinateSample>,
    pub relationship_sample: Vec<FeatureSample>,
}

/// Ingestion → cleaning → aggregation → sampling, in that order.
pub struct TripPipeline {
    config: AnalysisConfig,
}

impl TripPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub async fn ingest(&self, session: &AnalysisSession) -> Result<IngestedData> {
        ConcurrentReader::with_mmap(self.config.use_mmap)
            .read_all(&self.config.inputs, session.scratch_dir())
            .await
    }

    pub fn clean(&self, session: &AnalysisSession, data: IngestedData) -> Result<CleanedData> {
        let cleaner = TripCleaner::new()?.with_coordinate_policy(self.config.coordinate_policy);
        Ok(cleaner.clean(session, data.records))
    }

    /// Ingest and clean only.
    pub async fn prepare(
        &self,
        session: &AnalysisSession,
        progress: Option<&ProgressReporter>,
    ) -> Result<(Vec<FileSummary>, CleanedData)> {
        if let Some(p) = progress {
            p.set_message(&format!("Reading {} input(s)...", self.config.inputs.len()));
        }
        let mut data = self.ingest(session).await?;
        let files = std::mem::take(&mut data.files);

        if let Some(p) = progress {
            p.set_message(&format!("Cleaning {} rows...", data.total_rows()));
        }
        let cleaned = self.clean(session, data)?;

        Ok((files, cleaned))
    }

    pub async fn run(
        &self,
        session: &AnalysisSession,
        progress: Option<&ProgressReporter>,
    ) -> Result<AnalysisOutcome> {
        let (files, cleaned) = self.prepare(session, progress).await?;
        let CleanedData { records, report } = cleaned;

        if let Some(p) = progress {
            p.set_message("Aggregating trips by hour...");
        }
        // Always over the full cleaned set, never a sample
        let hourly = HourlyAggregator::new().aggregate(session, &records);

        if let Some(p) = progress {
            p.set_message("Sampling records...");
        }
        let sampler = Sampler::new(self.config.sample_fraction, self.config.sample_seed);
        let outlier_sample =
            sampler.draw(&records, OUTLIER_SAMPLE_STREAM, |r| CoordinateSample::from(r));
        let relationship_sample =
            sampler.draw(&records, RELATIONSHIP_SAMPLE_STREAM, |r| FeatureSample::from(r));

        info!(
            records = records.len(),
            hours = hourly.len(),
            outlier_sample = outlier_sample.len(),
            relationship_sample = relationship_sample.len(),
            "pipeline complete"
        );

        Ok(AnalysisOutcome {
            files,
            records,
            report,
            hourly,
            outlier_sample,
            relationship_sample,
        })
    }

    /// Run the analysis and chart it. A failed run reaches no renderer.
    pub async fn run_and_render(
        &self,
        session: &AnalysisSession,
        renderer: &ChartRenderer,
        progress: Option<&ProgressReporter>,
    ) -> Result<(AnalysisOutcome, Vec<PathBuf>)> {
        let outcome = self.run(session, progress).await?;

        if let Some(p) = progress {
            p.set_message("Rendering charts...");
        }
        let charts = renderer.render_all(session, &outcome)?;

        Ok((outcome, charts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineEnvironment;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_on_small_file() {
        let home = TempDir::new().unwrap();
        let env = EngineEnvironment::resolve_from(Some(home.path()), Some(Default::default())).unwrap();
        let session = AnalysisSession::start(&env, 2).unwrap();

        let input = home.path().join("trips.csv");
        fs::write(
            &input,
            "Date/Time,Lat,Lon,Base\n\
             4/1/2014 0:11:00,40.7690,-73.9549,B02512\n\
             4/1/2014 13:05:00,40.7,-74.0,B02512\n\
             4/2/2014 13:55:00,40.8,-73.9,B02598\n\
             garbage,40.8,-73.9,B02598\n",
        )
        .unwrap();

        let config = AnalysisConfig::new(vec![input]).with_sample_fraction(1.0);
        let outcome = TripPipeline::new(config).run(&session, None).await.unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.hourly.get(0), Some(1));
        assert_eq!(outcome.hourly.get(13), Some(2));
        assert_eq!(outcome.hourly.total_trips(), outcome.records.len() as u64);
        assert_eq!(outcome.outlier_sample.len(), 3);
        assert_eq!(outcome.relationship_sample[1].hour, 13);
        assert_eq!(outcome.files[0].rows, 4);
        assert_eq!(outcome.report.unparseable_timestamps, 1);
    }
}
