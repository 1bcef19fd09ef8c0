//! Layered settings: built-in defaults, an optional file, then `METEO__*`
//! environment variables.

use crate::error::Result;
use crate::harvester::dataset::{default_datasets, Dataset};
use crate::readers::RegionScanner;
use crate::utils::constants::{
    DEFAULT_DATA_FILE_PATTERN, DEFAULT_INITIAL_RETRY_DELAY_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_MAX_RETRY_DELAY_SECS, DEFAULT_REGION_PATTERN, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_PREFIX: &str = "METEO";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stations: StationsConfig,
    pub harvest: HarvestConfig,
}

/// Where observation files live inside the input tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationsConfig {
    pub region_pattern: String,
    pub file_pattern: String,
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            region_pattern: DEFAULT_REGION_PATTERN.to_string(),
            file_pattern: DEFAULT_DATA_FILE_PATTERN.to_string(),
        }
    }
}

impl StationsConfig {
    pub fn scanner(&self) -> Result<RegionScanner> {
        RegionScanner::new(&self.region_pattern, &self.file_pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub output_dir: PathBuf,
    pub max_retries: u32,
    pub initial_retry_delay_secs: u64,
    pub max_retry_delay_secs: u64,
    pub request_timeout_secs: u64,
    /// NASA Earthdata login, sent as HTTP basic auth when both are set
    pub username: Option<String>,
    pub password: Option<String>,
    pub datasets: Vec<Dataset>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("modis"),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_retry_delay_secs: DEFAULT_INITIAL_RETRY_DELAY_SECS,
            max_retry_delay_secs: DEFAULT_MAX_RETRY_DELAY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            username: None,
            password: None,
            datasets: default_datasets(),
        }
    }
}

impl HarvestConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_secs(self.initial_retry_delay_secs)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_secs(self.max_retry_delay_secs)
    }

    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        }
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

impl AppConfig {
    /// Load settings, reading `path` when given (format from its extension)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.stations.scanner()?;
        for dataset in &self.harvest.datasets {
            dataset.validate_patterns()?;
        }
        Ok(())
    }
}
