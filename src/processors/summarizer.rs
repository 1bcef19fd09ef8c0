use crate::models::{StationRecord, StationSummary};
use crate::processors::StationAggregator;
use tracing::warn;
use validator::Validate;

/// Turns the finished station mapping into output rows.
pub struct Summarizer;

impl Summarizer {
    /// One summary per station, ordered by station identifier.
    ///
    /// Summaries whose latest position falls outside the geographic ranges
    /// are kept but reported.
    pub fn summarize(aggregator: &StationAggregator) -> Vec<StationSummary> {
        Self::summarize_records(aggregator.records())
    }

    pub fn summarize_records<'a, I>(records: I) -> Vec<StationSummary>
    where
        I: IntoIterator<Item = &'a StationRecord>,
    {
        let mut summaries: Vec<StationSummary> = records
            .into_iter()
            .map(StationSummary::from_record)
            .collect();

        summaries.sort_by(|a, b| a.station_id.cmp(&b.station_id));

        for summary in &summaries {
            if let Err(e) = summary.validate() {
                warn!(station = %summary.station_id, error = %e, "Station summary out of range");
            }
        }

        summaries
    }
}
