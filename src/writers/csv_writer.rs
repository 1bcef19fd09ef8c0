use crate::error::Result;
use crate::models::{StationSummary, TrackedVariable};
use crate::utils::constants::OUTPUT_DATE_FORMAT;
use crate::utils::coordinates::format_degrees;
use std::io::Write;

/// Writes the station list as a comma-separated table with a header row.
pub struct StationListWriter {
    delimiter: u8,
}

impl StationListWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn headers() -> Vec<String> {
        let mut headers: Vec<String> = ["insee_id", "region", "lat", "lng", "days"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        headers.extend(TrackedVariable::ALL.iter().map(|v| v.column_name().to_string()));
        headers.extend(
            [
                "first_date",
                "last_date",
                "period_days",
                "region_count",
                "coordinate_count",
                "regions",
                "coordinates",
            ]
            .iter()
            .map(|h| h.to_string()),
        );
        headers
    }

    pub fn write<W: Write>(&self, summaries: &[StationSummary], sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        writer.write_record(Self::headers())?;
        for summary in summaries {
            writer.write_record(Self::fields(summary))?;
        }
        writer.flush()?;

        Ok(())
    }

    fn fields(summary: &StationSummary) -> Vec<String> {
        let mut fields = vec![
            summary.station_id.clone(),
            summary.region.clone(),
            format_degrees(summary.latitude),
            format_degrees(summary.longitude),
            summary.day_count.to_string(),
        ];
        fields.extend(summary.variable_counts.iter().map(|(_, count)| count.to_string()));
        fields.extend([
            summary.first_date.format(OUTPUT_DATE_FORMAT).to_string(),
            summary.last_date.format(OUTPUT_DATE_FORMAT).to_string(),
            summary.period_days.to_string(),
            summary.region_count.to_string(),
            summary.coordinate_count.to_string(),
            summary.regions_list(),
            summary.coordinates_list(),
        ]);
        fields
    }
}

impl Default for StationListWriter {
    fn default() -> Self {
        Self::new()
    }
}
