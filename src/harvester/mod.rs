pub mod dataset;
pub mod downloader;
pub mod fetcher;
pub mod harvest;
pub mod retry;

pub use dataset::{default_datasets, Dataset};
pub use downloader::{DownloadOutcome, FileDownloader, HttpFileDownloader};
pub use fetcher::{HttpPageFetcher, Link, LinkExtractor, PageFetcher};
pub use harvest::{DateEntry, HarvestReport, TileHarvester};
pub use retry::RetryPolicy;

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::utils::constants::DEFAULT_CONNECT_TIMEOUT_SECS;
use reqwest::Client;
use std::time::Duration;

/// HTTP client shared by the page fetcher and the downloader
pub fn build_client(config: &HarvestConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

pub fn retry_policy(config: &HarvestConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.max_retries,
        initial_delay: config.initial_retry_delay(),
        max_delay: config.max_retry_delay(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_from_config() {
        let config = HarvestConfig {
            max_retries: 5,
            initial_retry_delay_secs: 1,
            max_retry_delay_secs: 8,
            ..Default::default()
        };
        let policy = retry_policy(&config);

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10), Duration::from_secs(8));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&HarvestConfig::default()).is_ok());
    }
}
