use crate::utils::constants::{PARTIAL_SUFFIX, STATION_LIST_FILE};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default station list location: `<input_dir>/station_list.csv`
pub fn default_station_list_path(input_dir: &Path) -> PathBuf {
    input_dir.join(STATION_LIST_FILE)
}

/// Local destination of a tile: `<root>/<satellite>/<dataset>/<date>/<tile>`
pub fn tile_destination(
    root: &Path,
    satellite: &str,
    dataset: &str,
    date: &str,
    tile: &str,
) -> PathBuf {
    root.join(satellite).join(dataset).join(date).join(tile)
}

/// Sibling path used while a file is being written, e.g. `tile.hdf.partial`
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_station_list_path() {
        let path = default_station_list_path(Path::new("/data/observations"));
        assert_eq!(path, PathBuf::from("/data/observations/station_list.csv"));
    }

    #[test]
    fn test_tile_destination() {
        let path = tile_destination(
            Path::new("modis"),
            "aqua",
            "MYD11A1.006",
            "2020-01-15",
            "MYD11A1.A2020015.h18v04.006.2020017034410.hdf",
        );
        assert_eq!(
            path,
            PathBuf::from(
                "modis/aqua/MYD11A1.006/2020-01-15/MYD11A1.A2020015.h18v04.006.2020017034410.hdf"
            )
        );
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("out/station_list.csv")),
            PathBuf::from("out/station_list.csv.partial")
        );
    }
}
