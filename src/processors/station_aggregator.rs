use crate::error::{ProcessingError, Result};
use crate::models::{Coordinate, ObservationRow, StationRecord};
use crate::readers::{ObservationReader, RegionScanner};
use crate::utils::coordinates::convert_coordinate;
use crate::utils::progress::ProgressReporter;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters collected while folding a directory tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub regions_scanned: usize,
    pub files_read: usize,
    pub files_skipped: usize,
    pub files_failed: Vec<PathBuf>,
    pub rows_folded: u64,
    pub malformed_coordinates: u64,
    pub malformed_dates: u64,
    pub schema_mismatches: u64,
    pub other_row_errors: u64,
    pub stations: usize,
}

impl AggregationReport {
    pub fn rows_skipped(&self) -> u64 {
        self.malformed_coordinates
            + self.malformed_dates
            + self.schema_mismatches
            + self.other_row_errors
    }

    fn record_row_error(&mut self, error: &ProcessingError) {
        match error {
            ProcessingError::MalformedCoordinate(_) => self.malformed_coordinates += 1,
            ProcessingError::MalformedDate(_) => self.malformed_dates += 1,
            ProcessingError::SchemaMismatch { .. } => self.schema_mismatches += 1,
            _ => self.other_row_errors += 1,
        }
    }
}

impl fmt::Display for AggregationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Aggregation Summary")?;
        writeln!(f, "===================")?;
        writeln!(f, "Regions scanned: {}", self.regions_scanned)?;
        writeln!(
            f,
            "Files read: {} ({} skipped, {} unreadable)",
            self.files_read,
            self.files_skipped,
            self.files_failed.len()
        )?;
        writeln!(f, "Rows folded: {}", self.rows_folded)?;
        writeln!(
            f,
            "Rows skipped: {} (coordinates: {}, dates: {}, schema: {}, other: {})",
            self.rows_skipped(),
            self.malformed_coordinates,
            self.malformed_dates,
            self.schema_mismatches,
            self.other_row_errors
        )?;
        write!(f, "Stations: {}", self.stations)
    }
}

/// Accumulates one [`StationRecord`] per station identifier.
///
/// Rows are folded in the order they are supplied. The fold is not
/// commutative for the "latest" region and coordinate, so a single
/// aggregator owns the whole mapping.
#[derive(Debug, Default)]
pub struct StationAggregator {
    stations: HashMap<String, StationRecord>,
}

impl StationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation row seen under `region` into the mapping.
    ///
    /// Coordinates are converted before anything is touched, so a failing
    /// row leaves the aggregator exactly as it was.
    pub fn fold(&mut self, region: &str, row: &ObservationRow) -> Result<()> {
        let coordinate = Coordinate::new(
            convert_coordinate(&row.latitude)?,
            convert_coordinate(&row.longitude)?,
        );

        match self.stations.get_mut(&row.station_id) {
            Some(record) => record.absorb(region, coordinate, row.date, &row.measurements),
            None => {
                let record = StationRecord::new(
                    &row.station_id,
                    region,
                    coordinate,
                    row.date,
                    &row.measurements,
                );
                self.stations.insert(row.station_id.clone(), record);
            }
        }

        Ok(())
    }

    /// Fold every observation file found under `root`.
    ///
    /// Bad rows and unreadable files are logged, counted and skipped.
    pub fn aggregate_directory(
        &mut self,
        root: &Path,
        scanner: &RegionScanner,
        reader: &ObservationReader,
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregationReport> {
        let mut report = AggregationReport::default();

        let scan = scanner.scan(root)?;
        report.files_failed.extend(scan.unreadable);

        for region in scan.regions {
            info!(
                region = %region.name,
                files = region.data_files.len(),
                "Reading files for region"
            );
            report.regions_scanned += 1;

            for skipped in &region.skipped_files {
                info!(region = %region.name, file = %skipped, "Skipping non-data file");
                report.files_skipped += 1;
            }

            for path in &region.data_files {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if let Some(p) = progress {
                    p.set_message(&format!("{} / {}", region.name, file_name));
                }
                info!(region = %region.name, file = %file_name, "Reading observation file");

                let result = reader.read_observations(path, |line, row| {
                    match row.and_then(|row| self.fold(&region.name, &row)) {
                        Ok(()) => report.rows_folded += 1,
                        Err(e) => {
                            warn!(file = %file_name, line, error = %e, "Skipping row");
                            report.record_row_error(&e);
                        }
                    }
                });

                match result {
                    Ok(()) => report.files_read += 1,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                        report.files_failed.push(path.clone());
                    }
                }
            }
        }

        report.stations = self.stations.len();
        debug!(stations = report.stations, rows = report.rows_folded, "Aggregation finished");

        Ok(report)
    }

    pub fn get(&self, station_id: &str) -> Option<&StationRecord> {
        self.stations.get(station_id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &StationRecord> {
        self.stations.values()
    }
}
