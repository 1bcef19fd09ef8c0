//! Streamed tile downloads.
//!
//! Bytes go to a `.partial` sibling of the destination and are renamed into
//! place once the transfer completes, so an interrupted run never leaves a
//! truncated tile that a later run would mistake for a finished one.

use crate::error::{ProcessingError, Result};
use crate::harvester::retry::RetryPolicy;
use crate::utils::paths::partial_path;
use crate::utils::progress::ProgressReporter;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    AlreadyPresent,
    Downloaded { bytes: u64 },
}

#[async_trait]
pub trait FileDownloader: Send + Sync {
    /// Fetch `url` into `destination` unless the destination already exists
    async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome>;
}

pub struct HttpFileDownloader {
    client: Client,
    credentials: Option<(String, String)>,
    retry: RetryPolicy,
    quiet: bool,
}

impl HttpFileDownloader {
    pub fn new(client: Client, credentials: Option<(String, String)>, retry: RetryPolicy) -> Self {
        Self {
            client,
            credentials,
            retry,
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    async fn transfer(&self, url: &str, staging: &Path, label: &str) -> Result<u64> {
        let mut request = self.client.get(url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        let response = request.send().await?.error_for_status()?;

        let expected = response.content_length();
        let progress = ProgressReporter::new_transfer(label, self.quiet);
        if let Some(total) = expected {
            progress.set_length(total);
        }

        let mut file = fs::File::create(staging).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.update(written);
        }
        file.flush().await?;
        progress.finish_and_clear();

        if let Some(total) = expected {
            if written != total {
                return Err(ProcessingError::Download {
                    url: url.to_string(),
                    message: format!("expected {} bytes, received {}", total, written),
                });
            }
        }

        Ok(written)
    }
}

#[async_trait]
impl FileDownloader for HttpFileDownloader {
    #[instrument(skip(self), fields(destination = %destination.display()))]
    async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome> {
        if fs::try_exists(destination).await? {
            debug!("Already downloaded");
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let label = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let staging = partial_path(destination);

        let result = self
            .retry
            .run(url, || self.transfer(url, &staging, &label))
            .await;

        match result {
            Ok(bytes) => {
                fs::rename(&staging, destination).await?;
                info!(bytes, "Downloaded tile");
                Ok(DownloadOutcome::Downloaded { bytes })
            }
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                Err(e)
            }
        }
    }
}
