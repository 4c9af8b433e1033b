pub mod aggregate;
pub mod sample;
pub mod trip;

pub use aggregate::{HourlyAggregate, HourlyCount};
pub use sample::{CoordinateSample, FeatureSample};
pub use trip::{RawTripRecord, TripRecord};
