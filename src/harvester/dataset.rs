//! MODIS products crawled by the tile harvester.

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_DATE_PATTERN, DEFAULT_TILE_LOCATIONS, TILE_LOCATION_PLACEHOLDER,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A remote product archive laid out as `<url>/<YYYY.MM.DD>/<tile files>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Short product name, e.g. `MYD11A1.006`
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Platform directory the tiles are stored under (`aqua` or `terra`)
    pub satellite: String,
    /// Index page listing one directory per acquisition date
    pub url: String,
    /// Tile file name pattern; `LOCATION` is replaced by each tile location
    pub tilename_format: String,
    #[serde(default = "default_tile_locations")]
    pub tile_locations: Vec<String>,
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
}

fn default_tile_locations() -> Vec<String> {
    DEFAULT_TILE_LOCATIONS.iter().map(|l| l.to_string()).collect()
}

fn default_date_pattern() -> String {
    DEFAULT_DATE_PATTERN.to_string()
}

impl Dataset {
    pub fn new(name: &str, description: &str, satellite: &str, url: &str) -> Self {
        let product = name.split('.').next().unwrap_or(name);
        Self {
            name: name.to_string(),
            description: description.to_string(),
            satellite: satellite.to_string(),
            url: url.to_string(),
            tilename_format: format!(
                r"{}\.A\d{{7}}\.{}\..+\.hdf",
                regex::escape(product),
                TILE_LOCATION_PLACEHOLDER
            ),
            tile_locations: default_tile_locations(),
            date_pattern: default_date_pattern(),
        }
    }

    pub fn date_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.date_pattern)?)
    }

    /// A single pattern matching a tile at any of the configured locations
    pub fn tile_regex(&self) -> Result<Regex> {
        if self.tile_locations.is_empty() {
            return Err(ProcessingError::Config(format!(
                "Dataset {} has no tile locations",
                self.name
            )));
        }

        let alternatives: Vec<String> = self
            .tile_locations
            .iter()
            .map(|location| {
                format!(
                    "(?:{})",
                    self.tilename_format
                        .replace(TILE_LOCATION_PLACEHOLDER, &regex::escape(location))
                )
            })
            .collect();

        Ok(Regex::new(&format!("^(?:{})$", alternatives.join("|")))?)
    }

    pub fn validate_patterns(&self) -> Result<()> {
        if !self.tilename_format.contains(TILE_LOCATION_PLACEHOLDER) {
            return Err(ProcessingError::Config(format!(
                "Dataset {}: tilename_format must contain {}",
                self.name, TILE_LOCATION_PLACEHOLDER
            )));
        }
        self.date_regex()?;
        self.tile_regex()?;
        Ok(())
    }
}

/// Land products from the LP DAAC and snow cover from the NSIDC DAAC,
/// covering metropolitan France
pub fn default_datasets() -> Vec<Dataset> {
    vec![
        Dataset::new(
            "MYD11A1.006",
            "MODIS/Aqua Land Surface Temperature and Emissivity Daily L3 Global 1 km Grid SIN V006",
            "aqua",
            "https://e4ftl01.cr.usgs.gov/MOLA/MYD11A1.006/",
        ),
        Dataset::new(
            "MOD11A1.006",
            "MODIS/Terra Land Surface Temperature and Emissivity Daily L3 Global 1 km Grid SIN V006",
            "terra",
            "https://e4ftl01.cr.usgs.gov/MOLT/MOD11A1.006/",
        ),
        Dataset::new(
            "MYD13A3.006",
            "MODIS/Aqua Vegetation Indices Monthly L3 Global 1km Grid SIN V006",
            "aqua",
            "https://e4ftl01.cr.usgs.gov/MOLA/MYD13A3.006/",
        ),
        Dataset::new(
            "MOD13A3.006",
            "MODIS/Terra Vegetation Indices Monthly L3 Global 1km Grid SIN V006",
            "terra",
            "https://e4ftl01.cr.usgs.gov/MOLT/MOD13A3.006/",
        ),
        Dataset::new(
            "MYD10A1.006",
            "MODIS/Aqua Snow Cover Daily 500m v6",
            "aqua",
            "https://n5eil01u.ecs.nsidc.org/MOSA/MYD10A1.006/",
        ),
        Dataset::new(
            "MOD10A1.006",
            "MODIS/Terra Snow Cover Daily 500m v6",
            "terra",
            "https://n5eil01u.ecs.nsidc.org/MOST/MOD10A1.006/",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_datasets_are_valid() {
        let datasets = default_datasets();
        assert_eq!(datasets.len(), 6);
        for dataset in &datasets {
            dataset.validate_patterns().unwrap();
            assert!(dataset.url.ends_with('/'));
        }
    }

    #[test]
    fn test_tile_regex_matches_configured_locations() {
        let dataset = &default_datasets()[0];
        let pattern = dataset.tile_regex().unwrap();

        assert!(pattern.is_match("MYD11A1.A2020015.h18v04.006.2020017034410.hdf"));
        assert!(pattern.is_match("MYD11A1.A2020015.h17v04.006.2020017034410.hdf"));
        assert!(!pattern.is_match("MYD11A1.A2020015.h19v04.006.2020017034410.hdf"));
        assert!(!pattern.is_match("MYD11A1.A2020015.h18v04.006.2020017034410.hdf.xml"));
        assert!(!pattern.is_match("MOD11A1.A2020015.h18v04.006.2020017034410.hdf"));
    }

    #[test]
    fn test_date_regex() {
        let pattern = default_datasets()[0].date_regex().unwrap();
        assert!(pattern.is_match("2020.01.15/"));
        assert!(!pattern.is_match("Parent Directory"));
    }

    #[test]
    fn test_missing_placeholder_is_rejected() {
        let mut dataset = default_datasets()[0].clone();
        dataset.tilename_format = r"MYD11A1\..+\.hdf".to_string();
        assert!(dataset.validate_patterns().is_err());

        dataset.tilename_format = "MYD11A1(LOCATION".to_string();
        assert!(dataset.validate_patterns().is_err());
    }
}
