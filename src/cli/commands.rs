use crate::cli::args::{Cli, Commands, SourceArgs};
use crate::config::{AnalysisConfig, CoordinatePolicy};
use crate::engine::{AnalysisSession, EngineEnvironment};
use crate::error::{ProcessingError, Result};
use crate::models::TripRecord;
use crate::processors::TripPipeline;
use crate::readers::FileSummary;
use crate::utils::filename::generate_default_chart_dir;
use crate::utils::progress::ProgressReporter;
use crate::visualization::ChartRenderer;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Analyze {
            source,
            output_dir,
            sample_fraction,
            seed,
            preview,
            no_charts,
            plain_charts,
        } => {
            let config = build_config(&source)
                .with_sample_fraction(sample_fraction)
                .with_sample_seed(seed)
                .with_preview_rows(preview)
                .validated()
                .map_err(|e| report_failure("configuration", e))?;

            let session = start_session(&source, &config)?;

            println!("Analyzing {} trip log(s)...", config.inputs.len());
            println!(
                "Workers: {}, Sample fraction: {}, Seed: {}",
                session.workers(),
                config.sample_fraction,
                config.sample_seed
            );

            let progress = ProgressReporter::new_spinner("Starting analysis...", cli.quiet);
            let pipeline = TripPipeline::new(config);
            let (outcome, charts) = if no_charts {
                let outcome = pipeline.run(&session, Some(&progress)).await;
                (outcome.map_err(|e| report_failure("analysis", e))?, None)
            } else {
                let mut renderer =
                    ChartRenderer::new(output_dir.unwrap_or_else(generate_default_chart_dir));
                if plain_charts {
                    renderer = renderer.without_labels();
                }
                let (outcome, charts) = pipeline
                    .run_and_render(&session, &renderer, Some(&progress))
                    .await
                    .map_err(|e| report_failure("analysis", e))?;
                (outcome, Some(charts))
            };
            progress.finish_with_message(&format!(
                "Analyzed {} trips",
                outcome.records.len()
            ));

            println!("\n{}", format_file_summary(&outcome.files));
            println!("{}", outcome.report.generate_summary());

            if pipeline.config().preview_rows > 0 {
                println!(
                    "{}",
                    format_preview(&outcome.records, pipeline.config().preview_rows)
                );
            }

            println!("=== Trips by Hour ===");
            println!("{}", outcome.hourly.summary());
            if let Some(peak) = outcome.hourly.peak() {
                println!("Peak hour: {} ({} trips)", peak.hour, peak.num_trips);
            }

            match charts {
                None => println!("\nChart rendering skipped"),
                Some(charts) if charts.is_empty() => {
                    println!("\nNo charts rendered: nothing to plot")
                }
                Some(charts) => {
                    println!("\nCharts written:");
                    for chart in &charts {
                        println!("  {}", chart.display());
                    }
                }
            }

            session.stop()?;
            println!("Analysis complete!");
        }

        Commands::Validate { source } => {
            let config = build_config(&source)
                .validated()
                .map_err(|e| report_failure("configuration", e))?;

            let session = start_session(&source, &config)?;

            println!("Validating {} trip log(s)...", config.inputs.len());

            let progress = ProgressReporter::new_spinner("Validating data...", cli.quiet);
            let (files, cleaned) = TripPipeline::new(config)
                .prepare(&session, Some(&progress))
                .await
                .map_err(|e| report_failure("validation", e))?;
            progress.finish_with_message("Validation complete");

            println!("\n{}", format_file_summary(&files));
            println!("{}", cleaned.report.generate_summary());

            if cleaned.report.rows_dropped() == 0 && cleaned.report.invalid_coordinates == 0 {
                println!("✅ All rows passed cleaning");
            } else {
                println!(
                    "⚠️  {} row(s) dropped, {} with invalid coordinates",
                    cleaned.report.rows_dropped(),
                    cleaned.report.invalid_coordinates
                );
            }

            session.stop()?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let initialised = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };

    // Already set up by an embedding program or an earlier test
    if let Err(e) = initialised {
        debug!("Keeping the existing tracing subscriber: {}", e);
    }

    Ok(())
}

fn build_config(source: &SourceArgs) -> AnalysisConfig {
    let inputs = if source.inputs.is_empty() {
        AnalysisConfig::default_inputs(&source.data_dir)
    } else {
        source.inputs.clone()
    };

    let policy = if source.drop_invalid_coordinates {
        CoordinatePolicy::Drop
    } else {
        CoordinatePolicy::Retain
    };

    AnalysisConfig::new(inputs)
        .with_max_workers(source.max_workers)
        .with_coordinate_policy(policy)
        .with_mmap(source.mmap)
}

fn start_session(source: &SourceArgs, config: &AnalysisConfig) -> Result<AnalysisSession> {
    let environment = EngineEnvironment::resolve(source.engine_home.as_deref())
        .map_err(|e| report_failure("engine environment", e))?;
    info!("Engine home: {}", environment.home().display());

    AnalysisSession::start(&environment, config.max_workers)
        .map_err(|e| report_failure("session start", e))
}

/// Log a stage failure with a hint at what to check, then hand the error on.
fn report_failure(stage: &str, err: ProcessingError) -> ProcessingError {
    let hint = match &err {
        ProcessingError::EnvironmentUnset { .. } | ProcessingError::Environment { .. } => {
            "point --engine-home or TRIP_ENGINE_HOME at an existing directory"
        }
        ProcessingError::Ingestion { .. } => "check that every input file exists and is readable",
        ProcessingError::Validation(_) | ProcessingError::Config(_) => {
            "check --sample-fraction and --max-workers"
        }
        ProcessingError::Chart(_) => "check that the output directory is writable",
        _ => "re-run with --verbose for details",
    };
    error!("{} failed: {} ({})", stage, err, hint);
    err
}

fn format_file_summary(files: &[FileSummary]) -> String {
    let mut out = String::from("=== Inputs ===\n");
    for file in files {
        out.push_str(&format!("{}: {} rows\n", file.path.display(), file.rows));
    }
    let total: usize = files.iter().map(|f| f.rows).sum();
    out.push_str(&format!("Total: {} rows\n", total));
    out
}

/// First `rows` cleaned records with their derived calendar fields.
fn format_preview(records: &[TripRecord], rows: usize) -> String {
    let coordinate = |value: Option<f64>| value.map_or_else(|| "null".to_string(), |v| v.to_string());

    let mut out = format!("=== First {} Cleaned Records ===\n", rows.min(records.len()));
    out.push_str(&format!(
        "{:<19} | {:>4} | {:>7} | {:>5} | {:>9} | {:>9}\n",
        "DateTime", "Hour", "Weekday", "Month", "Lat", "Lon"
    ));
    for record in records.iter().take(rows) {
        out.push_str(&format!(
            "{:<19} | {:>4} | {:>7} | {:>5} | {:>9} | {:>9}\n",
            record.date_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.hour,
            record.weekday,
            record.month,
            coordinate(record.lat),
            coordinate(record.lon)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn source(inputs: Vec<PathBuf>) -> SourceArgs {
        SourceArgs {
            data_dir: PathBuf::from("data"),
            inputs,
            engine_home: None,
            max_workers: 3,
            drop_invalid_coordinates: true,
            mmap: false,
        }
    }

    #[test]
    fn test_logging_can_be_initialised_twice() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_file = dir.path().join("trip.log");

        assert!(init_logging(false, None).is_ok());
        assert!(init_logging(true, Some(&log_file)).is_ok());
        assert!(log_file.exists());
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_file = dir.path().join("missing").join("trip.log");

        assert!(matches!(init_logging(false, Some(&log_file)), Err(ProcessingError::Io(_))));
    }

    #[test]
    fn test_build_config_defaults_to_data_dir() {
        let config = build_config(&source(Vec::new()));

        assert_eq!(config.inputs.len(), 6);
        assert!(config.inputs[0].starts_with("data"));
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.coordinate_policy, CoordinatePolicy::Drop);
    }

    #[test]
    fn test_build_config_explicit_inputs_win() {
        let config = build_config(&source(vec![PathBuf::from("a.csv")]));
        assert_eq!(config.inputs, vec![PathBuf::from("a.csv")]);
    }

    #[test]
    fn test_preview_shows_null_coordinates() {
        let dt = NaiveDate::from_ymd_opt(2014, 4, 1)
            .unwrap()
            .and_hms_opt(0, 11, 0)
            .unwrap();
        let records = vec![
            TripRecord::from_timestamp(dt, Some(40.769), Some(-73.9549), Some("B02512".into())),
            TripRecord::from_timestamp(dt, None, Some(-73.9), None),
        ];

        let preview = format_preview(&records, 5);
        let lines: Vec<&str> = preview.lines().collect();

        assert_eq!(lines[0], "=== First 2 Cleaned Records ===");
        assert!(lines[1].starts_with("DateTime"));
        assert!(lines[2].starts_with("2014-04-01 00:11:00"));
        assert!(lines[2].contains("40.769"));
        assert!(lines[3].contains("null"));
        assert_eq!(lines.len(), 4);
    }
}
