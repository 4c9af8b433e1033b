use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One row as ingested: every field is text, `None` where the source cell
/// was empty or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTripRecord {
    pub date_time: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub base: Option<String>,
}

impl RawTripRecord {
    pub fn new(
        date_time: Option<String>,
        lat: Option<String>,
        lon: Option<String>,
        base: Option<String>,
    ) -> Self {
        Self {
            date_time,
            lat,
            lon,
            base,
        }
    }

    /// Convenience constructor for fully populated rows.
    pub fn from_fields(date_time: &str, lat: &str, lon: &str, base: &str) -> Self {
        Self::new(
            Some(date_time.to_string()),
            Some(lat.to_string()),
            Some(lon.to_string()),
            Some(base.to_string()),
        )
    }
}

/// A cleaned, time-enriched trip.
///
/// Calendar fields are derived from `date_time` as written, with no zone
/// conversion. `weekday` counts from Sunday: 1 = Sunday .. 7 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TripRecord {
    pub date_time: NaiveDateTime,

    pub lat: Option<f64>,

    pub lon: Option<f64>,

    pub base: Option<String>,

    #[validate(range(min = 0, max = 23))]
    pub hour: u32,

    #[validate(range(min = 1, max = 31))]
    pub day: u32,

    #[validate(range(min = 1, max = 7))]
    pub weekday: u32,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,
}

impl TripRecord {
    pub fn from_timestamp(
        date_time: NaiveDateTime,
        lat: Option<f64>,
        lon: Option<f64>,
        base: Option<String>,
    ) -> Self {
        Self {
            date_time,
            lat,
            lon,
            base,
            hour: date_time.hour(),
            day: date_time.day(),
            weekday: date_time.weekday().number_from_sunday(),
            month: date_time.month(),
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_calendar_fields() {
        // 2014-04-01 was a Tuesday
        let record = TripRecord::from_timestamp(at(2014, 4, 1, 0, 11), Some(40.769), Some(-73.9549), None);

        assert_eq!(record.hour, 0);
        assert_eq!(record.day, 1);
        assert_eq!(record.month, 4);
        assert_eq!(record.weekday, 3);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_weekday_counts_from_sunday() {
        // 2014-09-07 Sunday, 2014-09-13 Saturday
        let sunday = TripRecord::from_timestamp(at(2014, 9, 7, 23, 59), None, None, None);
        let saturday = TripRecord::from_timestamp(at(2014, 9, 13, 12, 0), None, None, None);

        assert_eq!(sunday.weekday, 1);
        assert_eq!(sunday.hour, 23);
        assert_eq!(saturday.weekday, 7);
    }
}
