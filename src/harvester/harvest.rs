use crate::error::Result;
use crate::harvester::dataset::Dataset;
use crate::harvester::downloader::{DownloadOutcome, FileDownloader};
use crate::harvester::fetcher::{Link, PageFetcher};
use crate::utils::paths::tile_destination;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// An acquisition date listed on a dataset index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntry {
    /// `YYYY-MM-DD`
    pub date: String,
    pub url: String,
}

/// Turn an index label such as `2020.01.15/` into `2020-01-15`
pub fn normalize_date_label(label: &str) -> String {
    label.trim().trim_end_matches('/').replace('.', "-")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub dataset: String,
    pub dates: usize,
    pub dates_failed: usize,
    pub tiles_found: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub bytes: u64,
    pub failed: Vec<String>,
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} dates ({} unreadable), {} tiles found, {} downloaded ({} bytes), {} already present, {} failed",
            self.dataset,
            self.dates,
            self.dates_failed,
            self.tiles_found,
            self.downloaded,
            self.bytes,
            self.already_present,
            self.failed.len()
        )
    }
}

/// Walks a dataset's date index and fetches every matching tile that is
/// not yet on disk. One request at a time.
pub struct TileHarvester<F, D> {
    fetcher: F,
    downloader: D,
    output_dir: PathBuf,
    dry_run: bool,
}

impl<F: PageFetcher, D: FileDownloader> TileHarvester<F, D> {
    pub fn new(fetcher: F, downloader: D, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            downloader,
            output_dir: output_dir.into(),
            dry_run: false,
        }
    }

    /// List tiles and destinations without downloading anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn find_dates(&self, dataset: &Dataset) -> Result<Vec<DateEntry>> {
        let pattern = dataset.date_regex()?;
        let links = self.fetcher.fetch(&dataset.url, &pattern).await?;

        let dates: Vec<DateEntry> = links
            .into_iter()
            .map(|link| DateEntry {
                date: normalize_date_label(&link.label),
                url: link.href,
            })
            .collect();

        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => info!(
                dataset = %dataset.name,
                count = dates.len(),
                from = %first.date,
                to = %last.date,
                "Found tilesets"
            ),
            _ => warn!(dataset = %dataset.name, "No dates found"),
        }

        Ok(dates)
    }

    pub async fn find_tiles(&self, dataset: &Dataset, date_url: &str) -> Result<Vec<Link>> {
        let pattern = dataset.tile_regex()?;
        let links = self.fetcher.fetch(date_url, &pattern).await?;

        let mut seen = HashSet::new();
        Ok(links
            .into_iter()
            .filter(|link| seen.insert(link.label.clone()))
            .collect())
    }

    pub async fn harvest(&self, dataset: &Dataset) -> Result<HarvestReport> {
        info!(dataset = %dataset.name, description = %dataset.description, "Acquiring dataset");

        let mut report = HarvestReport {
            dataset: dataset.name.clone(),
            ..Default::default()
        };

        let dates = self.find_dates(dataset).await?;
        report.dates = dates.len();

        for date in &dates {
            info!(dataset = %dataset.name, date = %date.date, "Listing tiles");
            let tiles = match self.find_tiles(dataset, &date.url).await {
                Ok(tiles) => tiles,
                Err(e) => {
                    warn!(date = %date.date, error = %e, "Skipping date");
                    report.dates_failed += 1;
                    continue;
                }
            };
            report.tiles_found += tiles.len();

            for tile in &tiles {
                let destination = tile_destination(
                    &self.output_dir,
                    &dataset.satellite,
                    &dataset.name,
                    &date.date,
                    &tile.label,
                );

                if self.dry_run {
                    debug!(
                        url = %tile.href,
                        destination = %destination.display(),
                        "Would download"
                    );
                    continue;
                }

                match self.downloader.download(&tile.href, &destination).await {
                    Ok(DownloadOutcome::AlreadyPresent) => {
                        debug!(tile = %tile.label, "Already downloaded");
                        report.already_present += 1;
                    }
                    Ok(DownloadOutcome::Downloaded { bytes }) => {
                        report.downloaded += 1;
                        report.bytes += bytes;
                    }
                    Err(e) => {
                        warn!(tile = %tile.label, error = %e, "Download failed");
                        report.failed.push(tile.label.clone());
                    }
                }
            }
        }

        info!(dataset = %dataset.name, "Done with dataset");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::harvester::dataset::default_datasets;
    use async_trait::async_trait;
    use regex::Regex;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const ROOT: &str = "https://e4ftl01.cr.usgs.gov/MOLA/MYD11A1.006/";

    struct FakeFetcher {
        pages: HashMap<String, Vec<Link>>,
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, pattern: &Regex) -> Result<Vec<Link>> {
            let links = self
                .pages
                .get(url)
                .ok_or_else(|| ProcessingError::Harvest(format!("no page {}", url)))?;
            Ok(links
                .iter()
                .filter(|l| pattern.is_match(&l.label))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeDownloader {
        calls: Mutex<Vec<(String, PathBuf)>>,
        broken: Option<String>,
    }

    #[async_trait]
    impl FileDownloader for FakeDownloader {
        async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome> {
            if destination.exists() {
                return Ok(DownloadOutcome::AlreadyPresent);
            }
            if self.broken.as_deref() == Some(url) {
                return Err(ProcessingError::Download {
                    url: url.to_string(),
                    message: "connection reset".to_string(),
                });
            }
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), destination.to_path_buf()));
            Ok(DownloadOutcome::Downloaded { bytes: 10 })
        }
    }

    fn tile_name(day: &str, location: &str) -> String {
        format!("MYD11A1.A2020{}.{}.006.2020017034410.hdf", day, location)
    }

    fn pages() -> HashMap<String, Vec<Link>> {
        let day1 = format!("{}2020.01.15/", ROOT);
        let day2 = format!("{}2020.01.16/", ROOT);
        let mut pages = HashMap::new();
        pages.insert(
            ROOT.to_string(),
            vec![
                Link::new("Parent Directory", "https://e4ftl01.cr.usgs.gov/MOLA/"),
                Link::new("2020.01.15/", day1.clone()),
                Link::new("2020.01.16/", day2.clone()),
                Link::new("2020.01.17/", format!("{}2020.01.17/", ROOT)),
            ],
        );
        let tiles = |day: &str, base: &str| {
            ["h17v04", "h18v04", "h21v09"]
                .iter()
                .flat_map(|loc| {
                    let name = tile_name(day, loc);
                    vec![
                        Link::new(name.clone(), format!("{}{}", base, name)),
                        Link::new(format!("{}.xml", name), format!("{}{}.xml", base, name)),
                    ]
                })
                .collect::<Vec<_>>()
        };
        pages.insert(day1.clone(), tiles("015", &day1));
        pages.insert(day2.clone(), tiles("016", &day2));
        pages
    }

    fn dataset() -> Dataset {
        default_datasets().remove(0)
    }

    #[test]
    fn test_normalize_date_label() {
        assert_eq!(normalize_date_label("2020.01.15/"), "2020-01-15");
        assert_eq!(normalize_date_label(" 2002.07.04 "), "2002-07-04");
    }

    #[tokio::test]
    async fn test_find_dates() -> Result<()> {
        let harvester = TileHarvester::new(
            FakeFetcher { pages: pages() },
            FakeDownloader::default(),
            "modis",
        );
        let dates = harvester.find_dates(&dataset()).await?;

        let labels: Vec<&str> = dates.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(labels, vec!["2020-01-15", "2020-01-16", "2020-01-17"]);
        assert_eq!(dates[0].url, format!("{}2020.01.15/", ROOT));
        Ok(())
    }

    #[tokio::test]
    async fn test_harvest_downloads_matching_tiles() -> Result<()> {
        let dir = TempDir::new()?;
        let broken = format!("{}2020.01.16/{}", ROOT, tile_name("016", "h18v04"));
        let harvester = TileHarvester::new(
            FakeFetcher { pages: pages() },
            FakeDownloader {
                broken: Some(broken),
                ..Default::default()
            },
            dir.path(),
        );

        // One tile is already on disk
        let existing = tile_destination(
            dir.path(),
            "aqua",
            "MYD11A1.006",
            "2020-01-15",
            &tile_name("015", "h17v04"),
        );
        std::fs::create_dir_all(existing.parent().unwrap())?;
        std::fs::write(&existing, b"")?;

        let report = harvester.harvest(&dataset()).await?;

        assert_eq!(report.dates, 3);
        assert_eq!(report.dates_failed, 1);
        assert_eq!(report.tiles_found, 4);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.bytes, 20);
        assert_eq!(report.failed, vec![tile_name("016", "h18v04")]);

        let calls = harvester.downloader.calls.lock().unwrap();
        assert_eq!(
            calls[0].1,
            tile_destination(
                dir.path(),
                "aqua",
                "MYD11A1.006",
                "2020-01-15",
                &tile_name("015", "h18v04")
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_dry_run_downloads_nothing() -> Result<()> {
        let harvester = TileHarvester::new(
            FakeFetcher { pages: pages() },
            FakeDownloader::default(),
            "modis",
        )
        .with_dry_run(true);

        let report = harvester.harvest(&dataset()).await?;

        assert_eq!(report.tiles_found, 4);
        assert_eq!(report.downloaded, 0);
        assert!(harvester.downloader.calls.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_index_is_an_error() {
        let harvester = TileHarvester::new(
            FakeFetcher {
                pages: HashMap::new(),
            },
            FakeDownloader::default(),
            "modis",
        );

        assert!(harvester.harvest(&dataset()).await.is_err());
    }
}
