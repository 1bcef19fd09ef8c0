use crate::models::observation::{Measurements, TrackedVariable};
use crate::utils::coordinates::format_degrees;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Station position in decimal degrees, rounded to six places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}",
            format_degrees(self.latitude),
            format_degrees(self.longitude)
        )
    }
}

/// Number of rows with a non-empty value, per tracked variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCounts([u32; TrackedVariable::COUNT]);

impl VariableCounts {
    pub fn record(&mut self, measurements: &Measurements) {
        for variable in TrackedVariable::ALL {
            if measurements.has_value(variable) {
                self.0[variable.index()] += 1;
            }
        }
    }

    pub fn get(&self, variable: TrackedVariable) -> u32 {
        self.0[variable.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackedVariable, u32)> + '_ {
        TrackedVariable::ALL.into_iter().map(|v| (v, self.get(v)))
    }
}

impl Index<TrackedVariable> for VariableCounts {
    type Output = u32;

    fn index(&self, variable: TrackedVariable) -> &u32 {
        &self.0[variable.index()]
    }
}

/// Everything learned about one station across all of its observation rows.
///
/// `regions` and `coordinates` keep first-seen order and only ever grow;
/// the last entry of each is the most recently observed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub station_id: String,
    pub regions: Vec<String>,
    pub coordinates: Vec<Coordinate>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub day_count: u32,
    pub variable_counts: VariableCounts,
}

impl StationRecord {
    /// Start a record from the first row seen for a station
    pub fn new(
        station_id: &str,
        region: &str,
        coordinate: Coordinate,
        date: NaiveDate,
        measurements: &Measurements,
    ) -> Self {
        let mut variable_counts = VariableCounts::default();
        variable_counts.record(measurements);

        Self {
            station_id: station_id.to_string(),
            regions: vec![region.to_string()],
            coordinates: vec![coordinate],
            first_date: date,
            last_date: date,
            day_count: 1,
            variable_counts,
        }
    }

    /// Fold a further row into the record
    pub fn absorb(
        &mut self,
        region: &str,
        coordinate: Coordinate,
        date: NaiveDate,
        measurements: &Measurements,
    ) {
        self.day_count += 1;

        if !self.regions.iter().any(|r| r == region) {
            self.regions.push(region.to_string());
        }

        if !self.coordinates.contains(&coordinate) {
            self.coordinates.push(coordinate);
        }

        if date < self.first_date {
            self.first_date = date;
        }
        if date > self.last_date {
            self.last_date = date;
        }

        self.variable_counts.record(measurements);
    }

    pub fn latest_region(&self) -> &str {
        self.regions.last().map(String::as_str).unwrap_or_default()
    }

    pub fn latest_coordinate(&self) -> Option<Coordinate> {
        self.coordinates.last().copied()
    }

    /// Days covered by the record, both bounds inclusive
    pub fn period_days(&self) -> i64 {
        (self.last_date - self.first_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn temperatures() -> Measurements {
        Measurements {
            tm: "10.2".to_string(),
            tn: "4.1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_record() {
        let coordinate = Coordinate::new(48.5, 2.25);
        let record = StationRecord::new(
            "75114001",
            "region1",
            coordinate,
            date(2020, 3, 1),
            &temperatures(),
        );

        assert_eq!(record.regions, vec!["region1"]);
        assert_eq!(record.coordinates, vec![coordinate]);
        assert_eq!(record.first_date, record.last_date);
        assert_eq!(record.day_count, 1);
        assert_eq!(record.variable_counts[TrackedVariable::Tm], 1);
        assert_eq!(record.variable_counts[TrackedVariable::Tn], 1);
        assert_eq!(record.variable_counts[TrackedVariable::Tx], 0);
        assert_eq!(record.period_days(), 1);
    }

    #[test]
    fn test_absorb_keeps_first_seen_order() {
        let first = Coordinate::new(48.5, 2.25);
        let second = Coordinate::new(48.500278, 2.25);
        let mut record = StationRecord::new(
            "75114001",
            "region2",
            first,
            date(2020, 3, 1),
            &Measurements::default(),
        );

        record.absorb("region1", second, date(2020, 3, 2), &Measurements::default());
        record.absorb("region2", first, date(2020, 3, 3), &Measurements::default());

        assert_eq!(record.regions, vec!["region2", "region1"]);
        assert_eq!(record.coordinates, vec![first, second]);
        assert_eq!(record.latest_region(), "region1");
        assert_eq!(record.latest_coordinate(), Some(second));
        assert_eq!(record.day_count, 3);
    }

    #[test]
    fn test_absorb_date_bounds() {
        let coordinate = Coordinate::new(45.0, 5.0);
        let none = Measurements::default();
        let mut record =
            StationRecord::new("38185001", "region3", coordinate, date(2020, 3, 1), &none);

        record.absorb("region3", coordinate, date(2020, 1, 15), &none);
        record.absorb("region3", coordinate, date(2020, 6, 10), &none);
        record.absorb("region3", coordinate, date(2020, 4, 1), &none);

        assert_eq!(record.first_date, date(2020, 1, 15));
        assert_eq!(record.last_date, date(2020, 6, 10));
        assert_eq!(record.period_days(), 148);
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(Coordinate::new(5.209444, -1.5).to_string(), "5.209444,-1.5");
        assert_eq!(Coordinate::new(45.0, -1.0).to_string(), "45.0,-1.0");
    }
}
