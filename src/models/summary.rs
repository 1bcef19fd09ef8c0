use crate::models::station::{Coordinate, StationRecord, VariableCounts};
use crate::utils::constants::LIST_SEPARATOR;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Flat, output-ready view of a [`StationRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationSummary {
    #[validate(length(min = 1))]
    pub station_id: String,

    /// Most recently appended region
    pub region: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub day_count: u32,
    pub variable_counts: VariableCounts,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub period_days: i64,
    pub region_count: usize,
    pub coordinate_count: usize,
    pub regions: Vec<String>,
    pub coordinates: Vec<Coordinate>,
}

impl StationSummary {
    pub fn from_record(record: &StationRecord) -> Self {
        // A record always holds at least the coordinate it was created with
        let latest = record
            .latest_coordinate()
            .unwrap_or_else(|| Coordinate::new(f64::NAN, f64::NAN));

        Self {
            station_id: record.station_id.clone(),
            region: record.latest_region().to_string(),
            latitude: latest.latitude,
            longitude: latest.longitude,
            day_count: record.day_count,
            variable_counts: record.variable_counts,
            first_date: record.first_date,
            last_date: record.last_date,
            period_days: record.period_days(),
            region_count: record.regions.len(),
            coordinate_count: record.coordinates.len(),
            regions: record.regions.clone(),
            coordinates: record.coordinates.clone(),
        }
    }

    /// All regions, first seen first, e.g. `region1|region2`
    pub fn regions_list(&self) -> String {
        self.regions.join(LIST_SEPARATOR)
    }

    /// All coordinate pairs, first seen first, e.g. `48.5,2.25|48.500278,2.25`
    pub fn coordinates_list(&self) -> String {
        self.coordinates
            .iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR)
    }
}
