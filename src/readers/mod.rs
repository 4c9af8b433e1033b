pub mod archive;
pub mod concurrent_reader;
pub mod trip_reader;

pub use archive::ArchiveExtractor;
pub use concurrent_reader::{ConcurrentReader, FileSummary, IngestedData};
pub use trip_reader::TripReader;
