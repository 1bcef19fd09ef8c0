pub mod constants;
pub mod coordinates;
pub mod paths;
pub mod progress;

pub use constants::*;
pub use coordinates::{convert_coordinate, format_degrees, round_to_precision};
pub use paths::{default_station_list_path, partial_path, tile_destination};
pub use progress::ProgressReporter;
