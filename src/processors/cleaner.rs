use crate::config::CoordinatePolicy;
use crate::engine::AnalysisSession;
use crate::error::Result;
use crate::models::{RawTripRecord, TripRecord};
use crate::processors::timestamp_parser::{ParseOutcome, TimestampParser};
use rayon::prelude::*;
use tracing::{debug, info};

/// Cast coordinate text the way a numeric column cast does: surrounding
/// whitespace is ignored and anything that is not a finite number is null.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatches {
    pub pattern: &'static str,
    pub rows: usize,
}

/// Where every ingested row went during cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub missing_key_fields: usize,
    pub unparseable_timestamps: usize,
    pub invalid_coordinates: usize,
    pub coordinate_policy: CoordinatePolicy,
    pub rows_kept: usize,
    pub pattern_matches: Vec<PatternMatches>,
}

impl CleaningReport {
    fn new(rows_read: usize, coordinate_policy: CoordinatePolicy, patterns: &[&'static str]) -> Self {
        Self {
            rows_read,
            missing_key_fields: 0,
            unparseable_timestamps: 0,
            invalid_coordinates: 0,
            coordinate_policy,
            rows_kept: 0,
            pattern_matches: patterns
                .iter()
                .map(|&pattern| PatternMatches { pattern, rows: 0 })
                .collect(),
        }
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }

    pub fn generate_summary(&self) -> String {
        let pct = |n: usize| {
            if self.rows_read == 0 {
                0.0
            } else {
                100.0 * n as f64 / self.rows_read as f64
            }
        };

        let mut summary = String::new();
        summary.push_str("=== Cleaning Report ===\n");
        summary.push_str(&format!("Rows Read: {}\n", self.rows_read));
        summary.push_str(&format!(
            "Rows Kept: {} ({:.1}%)\n",
            self.rows_kept,
            pct(self.rows_kept)
        ));
        summary.push_str(&format!(
            "Dropped, missing Date/Time/Lat/Lon: {} ({:.1}%)\n",
            self.missing_key_fields,
            pct(self.missing_key_fields)
        ));
        summary.push_str(&format!(
            "Dropped, unparseable timestamp: {} ({:.1}%)\n",
            self.unparseable_timestamps,
            pct(self.unparseable_timestamps)
        ));

        let action = match self.coordinate_policy {
            CoordinatePolicy::Retain => "retained with null coordinate",
            CoordinatePolicy::Drop => "dropped",
        };
        summary.push_str(&format!(
            "Invalid Lat/Lon, {}: {}\n",
            action, self.invalid_coordinates
        ));

        summary.push_str("\nTimestamp patterns matched:\n");
        for m in &self.pattern_matches {
            summary.push_str(&format!("  {:<22} {}\n", m.pattern, m.rows));
        }

        summary
    }
}

#[derive(Debug)]
pub struct CleanedData {
    pub records: Vec<TripRecord>,
    pub report: CleaningReport,
}

enum RowFate {
    MissingKeyField,
    UnparseableTimestamp,
    Kept {
        record: TripRecord,
        rank: usize,
        valid_coordinates: bool,
    },
}

/// Drops incomplete rows, parses timestamps, casts coordinates and derives
/// the calendar fields.
pub struct TripCleaner {
    parser: TimestampParser,
    coordinate_policy: CoordinatePolicy,
}

impl TripCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self::with_parser(TimestampParser::new()?))
    }

    pub fn with_parser(parser: TimestampParser) -> Self {
        Self {
            parser,
            coordinate_policy: CoordinatePolicy::default(),
        }
    }

    pub fn with_coordinate_policy(mut self, coordinate_policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = coordinate_policy;
        self
    }

    /// Clean all rows on the session's pool. Output keeps input order.
    pub fn clean(&self, session: &AnalysisSession, raw: Vec<RawTripRecord>) -> CleanedData {
        let mut report = CleaningReport::new(raw.len(), self.coordinate_policy, &self.parser.labels());

        let fates: Vec<RowFate> =
            session.install(|| raw.into_par_iter().map(|r| self.clean_record(r)).collect());

        let mut records = Vec::with_capacity(fates.len());
        for fate in fates {
            match fate {
                RowFate::MissingKeyField => report.missing_key_fields += 1,
                RowFate::UnparseableTimestamp => report.unparseable_timestamps += 1,
                RowFate::Kept {
                    record,
                    rank,
                    valid_coordinates,
                } => {
                    if !valid_coordinates {
                        report.invalid_coordinates += 1;
                        if self.coordinate_policy == CoordinatePolicy::Drop {
                            continue;
                        }
                    }
                    report.pattern_matches[rank].rows += 1;
                    records.push(record);
                }
            }
        }
        report.rows_kept = records.len();

        info!(
            read = report.rows_read,
            kept = report.rows_kept,
            missing = report.missing_key_fields,
            bad_timestamp = report.unparseable_timestamps,
            bad_coordinate = report.invalid_coordinates,
            "cleaned trip records"
        );

        CleanedData { records, report }
    }

    fn clean_record(&self, raw: RawTripRecord) -> RowFate {
        // Base is not a key field
        let RawTripRecord {
            date_time: Some(date_time),
            lat: Some(lat),
            lon: Some(lon),
            base,
        } = raw
        else {
            return RowFate::MissingKeyField;
        };

        let (value, rank) = match self.parser.parse(date_time.trim()) {
            ParseOutcome::Parsed { value, rank, .. } => (value, rank),
            ParseOutcome::NoMatch => {
                debug!(text = %date_time, "timestamp matched no pattern");
                return RowFate::UnparseableTimestamp;
            }
        };

        let lat = parse_coordinate(&lat);
        let lon = parse_coordinate(&lon);
        let valid_coordinates = lat.is_some() && lon.is_some();

        RowFate::Kept {
            record: TripRecord::from_timestamp(value, lat, lon, base),
            rank,
            valid_coordinates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineEnvironment;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn session(home: &TempDir) -> AnalysisSession {
        let env = EngineEnvironment::resolve_from(Some(home.path()), Some(Default::default())).unwrap();
        AnalysisSession::start(&env, 2).unwrap()
    }

    fn raw(date_time: Option<&str>, lat: Option<&str>, lon: Option<&str>) -> RawTripRecord {
        RawTripRecord::new(
            date_time.map(String::from),
            lat.map(String::from),
            lon.map(String::from),
            Some("B02512".to_string()),
        )
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("40.7690"), Some(40.769));
        assert_eq!(parse_coordinate("  -73.9549 "), Some(-73.9549));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("   "), None);
        assert_eq!(parse_coordinate("north"), None);
        assert_eq!(parse_coordinate("NaN"), None);
    }

    #[test]
    fn test_good_and_bad_timestamp() {
        let home = TempDir::new().unwrap();
        let session = session(&home);
        let cleaner = TripCleaner::new().unwrap();

        let cleaned = cleaner.clean(
            &session,
            vec![
                raw(Some("4/1/2014 0:11:00"), Some("40.7690"), Some("-73.9549")),
                raw(Some("not-a-date"), Some("40.0"), Some("-74.0")),
            ],
        );

        assert_eq!(cleaned.records.len(), 1);
        let record = &cleaned.records[0];
        assert_eq!((record.hour, record.day, record.month, record.weekday), (0, 1, 4, 3));
        assert_eq!(record.lat, Some(40.769));
        assert_eq!(cleaned.report.unparseable_timestamps, 1);
        assert_eq!(cleaned.report.pattern_matches[0].rows, 1);
        assert_eq!(cleaned.report.rows_dropped(), 1);
    }

    #[test]
    fn test_non_ascii_fraction_digits_dropped_not_fatal() {
        let home = TempDir::new().unwrap();
        let session = session(&home);

        let cleaned = TripCleaner::new().unwrap().clean(
            &session,
            vec![
                raw(Some("2014-04-01T08:05:00.١٢٣٤٥"), Some("40.7"), Some("-74.0")),
                raw(Some("2014-04-01T08:05:00.12345"), Some("40.7"), Some("-74.0")),
            ],
        );

        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].hour, 8);
        assert_eq!(cleaned.report.unparseable_timestamps, 1);
    }

    #[test]
    fn test_null_key_fields_dropped_and_whitespace_timestamp_fails_parse() {
        let home = TempDir::new().unwrap();
        let session = session(&home);
        let cleaner = TripCleaner::new().unwrap();

        let cleaned = cleaner.clean(
            &session,
            vec![
                raw(None, Some("40.7"), Some("-73.9")),
                raw(Some("4/1/2014 0:11:00"), None, Some("-73.9")),
                raw(Some("4/1/2014 0:11:00"), Some("40.7"), None),
                raw(Some("   "), Some("40.7"), Some("-73.9")),
                raw(Some("  4/1/2014 0:11:00  "), Some("40.7"), Some("-73.9")),
            ],
        );

        assert_eq!(cleaned.report.missing_key_fields, 3);
        assert_eq!(cleaned.report.unparseable_timestamps, 1);
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].hour, 0);
    }

    #[test]
    fn test_invalid_coordinates_retained_by_default() {
        let home = TempDir::new().unwrap();
        let session = session(&home);
        let cleaner = TripCleaner::new().unwrap();

        let cleaned = cleaner.clean(
            &session,
            vec![
                raw(Some("4/1/2014 5:00:00"), Some("  "), Some("-73.9")),
                raw(Some("4/1/2014 6:00:00"), Some("40.7"), Some("abc")),
            ],
        );

        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.records[0].lat, None);
        assert_eq!(cleaned.records[1].lon, None);
        assert_eq!(cleaned.report.invalid_coordinates, 2);
    }

    #[test]
    fn test_invalid_coordinates_dropped_by_policy() {
        let home = TempDir::new().unwrap();
        let session = session(&home);
        let cleaner = TripCleaner::new()
            .unwrap()
            .with_coordinate_policy(CoordinatePolicy::Drop);

        let cleaned = cleaner.clean(
            &session,
            vec![
                raw(Some("4/1/2014 5:00:00"), Some("  "), Some("-73.9")),
                raw(Some("4/1/2014 6:00:00"), Some("40.7"), Some("-73.9")),
            ],
        );

        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].hour, 6);
        assert_eq!(cleaned.report.invalid_coordinates, 1);
        assert_eq!(cleaned.report.rows_kept, 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let home = TempDir::new().unwrap();
        let session = session(&home);
        let cleaner = TripCleaner::new().unwrap();

        let rows: Vec<RawTripRecord> = (0..24)
            .map(|h| {
                let ts = format!("4/1/2014 {}:00:00", h);
                raw(Some(&ts), Some("40.7"), Some("-73.9"))
            })
            .collect();

        let cleaned = cleaner.clean(&session, rows);
        let hours: Vec<u32> = cleaned.records.iter().map(|r| r.hour).collect();
        assert_eq!(hours, (0..24).collect::<Vec<u32>>());
    }

    #[test]
    fn test_summary_mentions_policy() {
        let report = CleaningReport::new(0, CoordinatePolicy::Drop, &["default"]);
        let summary = report.generate_summary();
        assert!(summary.contains("Invalid Lat/Lon, dropped: 0"));
        assert!(summary.contains("default"));
    }
}
