pub mod observation;
pub mod station;
pub mod summary;

pub use observation::{Measurements, ObservationRow, TrackedVariable};
pub use station::{Coordinate, StationRecord, VariableCounts};
pub use summary::StationSummary;
