use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Pattern compilation error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Engine home is not usable: '{}' {reason}", path.display())]
    Environment { path: PathBuf, reason: String },

    #[error("Engine home is not configured: pass --engine-home or set {variable}")]
    EnvironmentUnset { variable: String },

    #[error("Failed to start analysis session: {0}")]
    SessionStart(String),

    #[error("Failed to ingest '{}': {source}", path.display())]
    Ingestion {
        path: PathBuf,
        #[source]
        source: Box<ProcessingError>,
    },

    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Attach the offending input file to an ingestion failure.
    pub fn ingestion(path: impl Into<PathBuf>, source: ProcessingError) -> Self {
        ProcessingError::Ingestion {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ProcessingError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ProcessingError::Chart(err.to_string())
    }
}
