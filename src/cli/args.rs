use crate::utils::constants::{
    DEFAULT_DATA_DIR, DEFAULT_PREVIEW_ROWS, DEFAULT_SAMPLE_FRACTION, DEFAULT_SAMPLE_SEED,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trip-processor")]
#[command(about = "Exploratory analysis of ride-hailing pickup logs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest, clean, aggregate, sample and chart the trip logs
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            short,
            long,
            help = "Chart output directory [default: output/trip-charts-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_SAMPLE_FRACTION, help = "Fraction of records drawn for each sample")]
        sample_fraction: f64,

        #[arg(
            long,
            default_value_t = DEFAULT_SAMPLE_SEED,
            help = "Seed of the outlier sample; the relationship sample uses seed + 1"
        )]
        seed: u64,

        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS, help = "Cleaned records to preview (0 = none)")]
        preview: usize,

        #[arg(long, help = "Print the reports without rendering charts")]
        no_charts: bool,

        #[arg(long, help = "Render charts without titles or axis text (no system fonts needed)")]
        plain_charts: bool,
    },

    /// Ingest and clean the trip logs, then print the cleaning report
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Input selection and engine options shared by every command.
#[derive(Args, Clone)]
pub struct SourceArgs {
    #[arg(short, long, default_value = DEFAULT_DATA_DIR, help = "Directory holding the six monthly trip logs")]
    pub data_dir: PathBuf,

    #[arg(
        short,
        long,
        num_args = 1..,
        help = "Explicit input files or zip archives (overrides --data-dir)"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(long, help = "Analysis engine home directory [default: $TRIP_ENGINE_HOME]")]
    pub engine_home: Option<PathBuf>,

    #[arg(long, default_value_t = num_cpus::get())]
    pub max_workers: usize,

    #[arg(long, help = "Drop records whose Lat/Lon do not parse instead of keeping them with null coordinates")]
    pub drop_invalid_coordinates: bool,

    #[arg(long, help = "Memory-map input files while reading")]
    pub mmap: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_seed_help_names_both_draws() {
        let mut cmd = Cli::command();
        let analyze = cmd.find_subcommand_mut("analyze").unwrap();
        let seed = analyze
            .get_arguments()
            .find(|arg| arg.get_id().as_str() == "seed")
            .unwrap();

        let help = seed.get_help().unwrap().to_string();
        assert!(help.contains("seed + 1"));
    }

    #[test]
    fn test_analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "trip-processor",
            "analyze",
            "--seed",
            "7",
            "--plain-charts",
            "-i",
            "a.csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { seed, plain_charts, no_charts, source, .. } => {
                assert_eq!(seed, 7);
                assert!(plain_charts);
                assert!(!no_charts);
                assert_eq!(source.inputs, vec![PathBuf::from("a.csv")]);
            }
            Commands::Validate { .. } => panic!("expected analyze"),
        }
    }
}
