use crate::error::{ProcessingError, Result};
use crate::models::RawTripRecord;
use crate::utils::constants::{
    COLUMN_BASE, COLUMN_DATE_TIME, COLUMN_LAT, COLUMN_LON, DEFAULT_BUFFER_SIZE,
};
use csv::{ByteRecord, ReaderBuilder};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Positions of the required columns within a file's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    date_time: usize,
    lat: usize,
    lon: usize,
    base: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &ByteRecord) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| decode_field(h).trim().to_string())
            .collect();

        let find = |column: &str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: column.to_string(),
                })
        };

        Ok(Self {
            date_time: find(COLUMN_DATE_TIME)?,
            lat: find(COLUMN_LAT)?,
            lon: find(COLUMN_LON)?,
            base: find(COLUMN_BASE)?,
        })
    }
}

/// Reads trip-log CSV files into text-typed raw records.
pub struct TripReader {
    use_mmap: bool,
}

impl TripReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read every row of a trip-log file. Any failure is reported against
    /// `path`.
    pub fn read_trips(&self, path: &Path) -> Result<Vec<RawTripRecord>> {
        let result = if self.use_mmap {
            self.read_trips_mmap(path)
        } else {
            self.read_trips_buffered(path)
        };

        let records = result.map_err(|e| ProcessingError::ingestion(path, e))?;
        debug!(path = %path.display(), rows = records.len(), "read trip file");
        Ok(records)
    }

    fn read_trips_buffered(&self, path: &Path) -> Result<Vec<RawTripRecord>> {
        let file = File::open(path)?;
        self.read_from(file)
    }

    fn read_trips_mmap(&self, path: &Path) -> Result<Vec<RawTripRecord>> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        self.read_from(&mmap[..])
    }

    /// Parse CSV content with a header row. Empty cells and cells missing
    /// from short rows become `None`.
    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<RawTripRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(source);

        let layout = ColumnLayout::from_headers(reader.byte_headers()?)?;

        let mut records = Vec::new();
        let mut row = ByteRecord::new();
        while reader.read_byte_record(&mut row)? {
            records.push(RawTripRecord::new(
                text_field(&row, layout.date_time),
                text_field(&row, layout.lat),
                text_field(&row, layout.lon),
                text_field(&row, layout.base),
            ));
        }

        Ok(records)
    }
}

impl Default for TripReader {
    fn default() -> Self {
        Self::new()
    }
}

fn text_field(row: &ByteRecord, index: usize) -> Option<String> {
    match row.get(index) {
        Some(bytes) if !bytes.is_empty() => Some(decode_field(bytes)),
        _ => None,
    }
}

/// UTF-8 when valid, otherwise Windows-1252 (what older exports use).
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => encoding_rs::WINDOWS_1252
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}
