use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: u32,
    pub num_trips: u64,
}

/// Trip counts per hour of day, ascending by hour. Hours with no trips are
/// absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyAggregate {
    counts: Vec<HourlyCount>,
}

impl HourlyAggregate {
    /// Build from a dense per-hour histogram, skipping empty hours.
    pub fn from_histogram(histogram: &[u64]) -> Self {
        let counts = histogram
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(hour, &num_trips)| HourlyCount {
                hour: hour as u32,
                num_trips,
            })
            .collect();

        Self { counts }
    }

    pub fn counts(&self) -> &[HourlyCount] {
        &self.counts
    }

    pub fn get(&self, hour: u32) -> Option<u64> {
        self.counts
            .binary_search_by_key(&hour, |c| c.hour)
            .ok()
            .map(|i| self.counts[i].num_trips)
    }

    pub fn total_trips(&self) -> u64 {
        self.counts.iter().map(|c| c.num_trips).sum()
    }

    pub fn peak(&self) -> Option<HourlyCount> {
        self.counts.iter().copied().max_by_key(|c| c.num_trips)
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().map(|c| c.num_trips).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Plain text table: one `Hour | NumTrips` line per present hour.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Hour | NumTrips\n");
        out.push_str("-----+---------\n");
        for c in &self.counts {
            out.push_str(&format!("{:>4} | {:>8}\n", c.hour, c.num_trips));
        }
        out.push_str(&format!("Total: {}\n", self.total_trips()));
        out
    }
}
