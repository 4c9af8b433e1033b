use crate::error::{ProcessingError, Result};
use crate::models::RawTripRecord;
use crate::readers::archive::{is_zip_archive, ArchiveExtractor};
use crate::readers::TripReader;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::info;

/// Reads a set of trip-log files concurrently, one blocking task per file.
pub struct ConcurrentReader {
    use_mmap: bool,
}

impl ConcurrentReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read all inputs into one dataset.
    ///
    /// Zip inputs are unpacked into `scratch_dir` first. Rows keep input
    /// order (file by file, then row by row). The first failing file fails
    /// the whole read.
    pub async fn read_all(&self, inputs: &[PathBuf], scratch_dir: &Path) -> Result<IngestedData> {
        let csv_files = self.expand_inputs(inputs, scratch_dir).await?;

        let handles: Vec<(PathBuf, JoinHandle<Result<Vec<RawTripRecord>>>)> = csv_files
            .into_iter()
            .map(|path| {
                let task_path = path.clone();
                let use_mmap = self.use_mmap;
                let handle = tokio::task::spawn_blocking(move || {
                    TripReader::with_mmap(use_mmap).read_trips(&task_path)
                });
                (path, handle)
            })
            .collect();

        let mut data = IngestedData::default();
        for (path, handle) in handles {
            let records = handle.await??;
            info!(path = %path.display(), rows = records.len(), "ingested trip file");
            data.files.push(FileSummary {
                path,
                rows: records.len(),
            });
            data.records.extend(records);
        }

        Ok(data)
    }

    /// Replace zip inputs by the CSV files they contain.
    async fn expand_inputs(&self, inputs: &[PathBuf], scratch_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            if !is_zip_archive(input) {
                files.push(input.clone());
                continue;
            }

            let zip_path = input.clone();
            // One directory per input position
            let dest = scratch_dir.join("extracted").join(index.to_string());
            let members = tokio::task::spawn_blocking(move || {
                ArchiveExtractor::new()
                    .extract_csv_members(&zip_path, &dest)
                    .map_err(|e| ProcessingError::ingestion(&zip_path, e))
            })
            .await??;
            files.extend(members);
        }

        Ok(files)
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct FileSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// All raw rows from one ingestion pass.
#[derive(Debug, Default)]
pub struct IngestedData {
    pub records: Vec<RawTripRecord>,
    pub files: Vec<FileSummary>,
}

impl IngestedData {
    pub fn total_rows(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut content = String::from("Date/Time,Lat,Lon,Base\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_rows_keep_input_order() {
        let dir = TempDir::new().unwrap();
        let a = write_csv(
            dir.path(),
            "a.csv",
            &["4/1/2014 0:11:00,40.7,-73.9,B1", "4/1/2014 0:12:00,40.7,-73.9,B1"],
        );
        let b = write_csv(dir.path(), "b.csv", &["5/1/2014 0:11:00,40.7,-73.9,B2"]);

        let data = ConcurrentReader::new()
            .read_all(&[b.clone(), a.clone()], dir.path())
            .await
            .unwrap();

        assert_eq!(data.total_rows(), 3);
        assert_eq!(data.records[0].base.as_deref(), Some("B2"));
        assert_eq!(data.records[1].date_time.as_deref(), Some("4/1/2014 0:11:00"));
        assert_eq!(data.files[0].path, b);
        assert_eq!(data.files[1].rows, 2);
    }

    #[tokio::test]
    async fn test_any_missing_file_fails_the_read() {
        let dir = TempDir::new().unwrap();
        let a = write_csv(dir.path(), "a.csv", &["4/1/2014 0:11:00,40.7,-73.9,B1"]);
        let missing = dir.path().join("missing.csv");

        let result = ConcurrentReader::new()
            .read_all(&[a, missing], dir.path())
            .await;

        match result {
            Err(ProcessingError::Ingestion { path, .. }) => assert!(path.ends_with("missing.csv")),
            other => panic!("expected ingestion error, got {:?}", other.map(|d| d.total_rows())),
        }
    }
}
