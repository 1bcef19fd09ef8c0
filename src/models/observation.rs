use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variables whose presence is counted per station, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedVariable {
    /// Daily mean temperature
    Tm,
    /// Daily minimum temperature
    Tn,
    /// Daily maximum temperature
    Tx,
    /// Mean of minimum and maximum
    Tntxm,
}

impl TrackedVariable {
    pub const COUNT: usize = 4;

    pub const ALL: [TrackedVariable; Self::COUNT] = [
        TrackedVariable::Tm,
        TrackedVariable::Tn,
        TrackedVariable::Tx,
        TrackedVariable::Tntxm,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            TrackedVariable::Tm => "tm",
            TrackedVariable::Tn => "tn",
            TrackedVariable::Tx => "tx",
            TrackedVariable::Tntxm => "tntxm",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TrackedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// Raw measurement and quality fields of a daily observation.
///
/// Values are kept as the strings found in the file: an empty string means
/// the station did not report that variable on that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurements {
    pub tm: String,
    pub tn: String,
    pub tx: String,
    pub tntxm: String,
    pub ffm: String,
    pub rr: String,
    pub um: String,
    pub un: String,
    pub ux: String,
    pub visx: String,
    pub visn: String,
}

impl Measurements {
    pub fn value(&self, variable: TrackedVariable) -> &str {
        match variable {
            TrackedVariable::Tm => &self.tm,
            TrackedVariable::Tn => &self.tn,
            TrackedVariable::Tx => &self.tx,
            TrackedVariable::Tntxm => &self.tntxm,
        }
    }

    pub fn has_value(&self, variable: TrackedVariable) -> bool {
        !self.value(variable).is_empty()
    }
}

/// One parsed line of a station observation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub station_id: String,
    /// Latitude as `(D)DMMSS`, converted during aggregation
    pub latitude: String,
    /// Longitude as `(D)DMMSS`, converted during aggregation
    pub longitude: String,
    pub date: NaiveDate,
    pub measurements: Measurements,
}

impl ObservationRow {
    pub fn new(
        station_id: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        date: NaiveDate,
        measurements: Measurements,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
            date,
            measurements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_variable_order() {
        let names: Vec<&str> = TrackedVariable::ALL
            .iter()
            .map(|v| v.column_name())
            .collect();
        assert_eq!(names, vec!["tm", "tn", "tx", "tntxm"]);

        for (position, variable) in TrackedVariable::ALL.iter().enumerate() {
            assert_eq!(variable.index(), position);
        }
    }

    #[test]
    fn test_measurement_presence() {
        let measurements = Measurements {
            tm: "12.4".to_string(),
            tx: "0".to_string(),
            ..Default::default()
        };

        assert!(measurements.has_value(TrackedVariable::Tm));
        assert!(!measurements.has_value(TrackedVariable::Tn));
        // Zero is an observation, not a gap
        assert!(measurements.has_value(TrackedVariable::Tx));
        assert!(!measurements.has_value(TrackedVariable::Tntxm));
    }
}
