pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::StationListWriter;
pub use parquet_writer::SummaryParquetWriter;

use crate::error::{ProcessingError, Result};
use crate::models::StationSummary;
use crate::utils::paths::partial_path;
use clap::ValueEnum;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

/// Write the station list to `path`.
///
/// Output goes to a `.partial` sibling first and is renamed into place once
/// complete, so a failed write never leaves a truncated table behind.
pub fn write_station_list(
    summaries: &[StationSummary],
    path: &Path,
    format: OutputFormat,
    compression: &str,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = partial_path(path);
    let result = File::create(&staging)
        .map_err(ProcessingError::from)
        .and_then(|file| match format {
            OutputFormat::Csv => StationListWriter::new().write(summaries, BufWriter::new(file)),
            OutputFormat::Parquet => SummaryParquetWriter::new()
                .with_compression(compression)?
                .write(summaries, file),
        });

    match result {
        Ok(()) => {
            fs::rename(&staging, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_station_list_replaces_staging_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out").join("station_list.csv");

        write_station_list(&[], &path, OutputFormat::Csv, "snappy")?;

        assert!(path.exists());
        assert!(!partial_path(&path).exists());
        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("station_list.parquet");

        let result = write_station_list(&[], &path, OutputFormat::Parquet, "bogus");

        assert!(result.is_err());
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
        Ok(())
    }
}
