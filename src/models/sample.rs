use crate::models::TripRecord;
use serde::{Deserialize, Serialize};

/// Projection used by the latitude/longitude boxplots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSample {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl From<&TripRecord> for CoordinateSample {
    fn from(record: &TripRecord) -> Self {
        Self {
            lat: record.lat,
            lon: record.lon,
        }
    }
}

/// Projection used by the time/location pairplot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl FeatureSample {
    pub const COLUMNS: [&'static str; 5] = ["Hour", "Day", "Month", "Lat", "Lon"];

    /// Value of the `index`-th column in [`FeatureSample::COLUMNS`] order.
    pub fn value(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(f64::from(self.hour)),
            1 => Some(f64::from(self.day)),
            2 => Some(f64::from(self.month)),
            3 => self.lat,
            4 => self.lon,
            _ => None,
        }
    }
}

impl From<&TripRecord> for FeatureSample {
    fn from(record: &TripRecord) -> Self {
        Self {
            hour: record.hour,
            day: record.day,
            month: record.month,
            lat: record.lat,
            lon: record.lon,
        }
    }
}
