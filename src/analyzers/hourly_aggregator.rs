use crate::engine::AnalysisSession;
use crate::models::{HourlyAggregate, TripRecord};
use crate::utils::constants::HOURS_PER_DAY;
use rayon::prelude::*;
use tracing::debug;

/// Group-by-hour count over the full cleaned dataset.
pub struct HourlyAggregator;

impl HourlyAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, session: &AnalysisSession, records: &[TripRecord]) -> HourlyAggregate {
        let histogram = session.install(|| {
            records
                .par_iter()
                .fold(
                    || [0u64; HOURS_PER_DAY],
                    |mut acc, record| {
                        acc[record.hour as usize % HOURS_PER_DAY] += 1;
                        acc
                    },
                )
                .reduce(
                    || [0u64; HOURS_PER_DAY],
                    |mut left, right| {
                        for (l, r) in left.iter_mut().zip(right.iter()) {
                            *l += r;
                        }
                        left
                    },
                )
        });

        let aggregate = HourlyAggregate::from_histogram(&histogram);
        debug!(
            hours = aggregate.len(),
            trips = aggregate.total_trips(),
            "aggregated trips by hour"
        );
        aggregate
    }
}

impl Default for HourlyAggregator {
    fn default() -> Self {
        Self::new()
    }
}
