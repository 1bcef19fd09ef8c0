pub mod station_aggregator;
pub mod summarizer;

pub use station_aggregator::{AggregationReport, StationAggregator};
pub use summarizer::Summarizer;
