pub mod observation_reader;
pub mod region_scanner;

pub use observation_reader::{parse_observation_date, ObservationReader};
pub use region_scanner::{RegionDirectory, RegionScan, RegionScanner};
