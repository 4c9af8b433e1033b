pub mod cleaner;
pub mod pipeline;
pub mod timestamp_parser;

pub use cleaner::{parse_coordinate, CleanedData, CleaningReport, PatternMatches, TripCleaner};
pub use pipeline::{AnalysisOutcome, TripPipeline};
pub use timestamp_parser::{DefaultStrategy, LayoutStrategy, ParseOutcome, ParseStrategy, TimestampParser};
