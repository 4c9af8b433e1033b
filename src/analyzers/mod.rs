pub mod hourly_aggregator;
pub mod sampler;

pub use hourly_aggregator::HourlyAggregator;
pub use sampler::Sampler;
