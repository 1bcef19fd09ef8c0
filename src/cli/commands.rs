use crate::cli::args::{Cli, Commands};
use crate::config::{AppConfig, HarvestConfig};
use crate::error::{ProcessingError, Result};
use crate::harvester::{
    build_client, retry_policy, Dataset, HttpFileDownloader, HttpPageFetcher, TileHarvester,
};
use crate::processors::{StationAggregator, Summarizer};
use crate::readers::ObservationReader;
use crate::utils::paths::default_station_list_path;
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_station_list, OutputFormat};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(&cli)?;

    let config = AppConfig::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Stations {
            input_dir,
            output_file,
            format,
            compression,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| default_output_path(&input_dir, format));
            run_stations(&config, &input_dir, &output_file, format, &compression, quiet)
        }

        Commands::Harvest {
            output_dir,
            dataset,
            dry_run,
        } => {
            let mut harvest = config.harvest.clone();
            if let Some(dir) = output_dir {
                harvest.output_dir = dir;
            }
            run_harvest(&harvest, &dataset, dry_run, quiet).await
        }

        Commands::Datasets => {
            for dataset in &config.harvest.datasets {
                println!(
                    "{:<14} {:<6} {}\n{:<21} {}\n{:<21} tiles: {}",
                    dataset.name,
                    dataset.satellite,
                    dataset.description,
                    "",
                    dataset.url,
                    "",
                    dataset.tile_locations.join(", ")
                );
            }
            Ok(())
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    let installed = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            let subscriber = builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    installed.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

fn default_output_path(input_dir: &Path, format: OutputFormat) -> PathBuf {
    let path = default_station_list_path(input_dir);
    match format {
        OutputFormat::Csv => path,
        OutputFormat::Parquet => path.with_extension("parquet"),
    }
}

fn run_stations(
    config: &AppConfig,
    input_dir: &Path,
    output_file: &Path,
    format: OutputFormat,
    compression: &str,
    quiet: bool,
) -> Result<()> {
    if !input_dir.is_dir() {
        return Err(ProcessingError::Config(format!(
            "Input directory {} does not exist",
            input_dir.display()
        )));
    }

    info!(input = %input_dir.display(), output = %output_file.display(), "Building station list");

    let scanner = config.stations.scanner()?;
    let reader = ObservationReader::new();
    let mut aggregator = StationAggregator::new();

    let progress = ProgressReporter::new_spinner("Reading observation files...", quiet);
    let report = aggregator.aggregate_directory(input_dir, &scanner, &reader, Some(&progress))?;
    progress.finish_with_message(&format!("Aggregated {} stations", aggregator.len()));

    if !quiet {
        println!("\n{}", report);
    }

    let summaries = Summarizer::summarize(&aggregator);
    write_station_list(&summaries, output_file, format, compression)?;

    println!(
        "Wrote {} stations to {}",
        summaries.len(),
        output_file.display()
    );
    Ok(())
}

fn select_datasets<'a>(config: &'a HarvestConfig, names: &[String]) -> Result<Vec<&'a Dataset>> {
    if names.is_empty() {
        return Ok(config.datasets.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            config
                .dataset(name)
                .ok_or_else(|| ProcessingError::Config(format!("Unknown dataset: {}", name)))
        })
        .collect()
}

async fn run_harvest(
    config: &HarvestConfig,
    names: &[String],
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let datasets = select_datasets(config, names)?;
    if config.credentials().is_none() {
        info!("No Earthdata credentials configured; protected archives will refuse downloads");
    }

    let client = build_client(config)?;
    let retry = retry_policy(config);
    let fetcher = HttpPageFetcher::new(client.clone(), config.credentials(), retry)?;
    let downloader =
        HttpFileDownloader::new(client, config.credentials(), retry).with_quiet(quiet);
    let harvester =
        TileHarvester::new(fetcher, downloader, &config.output_dir).with_dry_run(dry_run);

    let mut failed = Vec::new();
    for dataset in &datasets {
        match harvester.harvest(dataset).await {
            Ok(report) => println!("{}", report),
            Err(e) => {
                error!(dataset = %dataset.name, error = %e, "Dataset harvest failed");
                failed.push(dataset.name.as_str());
            }
        }
    }

    if !datasets.is_empty() && failed.len() == datasets.len() {
        return Err(ProcessingError::Harvest(format!(
            "no dataset index could be read ({})",
            failed.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_follows_format() {
        let dir = Path::new("/data/obs");
        assert_eq!(
            default_output_path(dir, OutputFormat::Csv),
            PathBuf::from("/data/obs/station_list.csv")
        );
        assert_eq!(
            default_output_path(dir, OutputFormat::Parquet),
            PathBuf::from("/data/obs/station_list.parquet")
        );
    }

    #[test]
    fn test_select_datasets() -> Result<()> {
        let config = HarvestConfig::default();

        assert_eq!(select_datasets(&config, &[])?.len(), 6);

        let picked = select_datasets(&config, &["mod10a1.006".to_string()])?;
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].satellite, "terra");

        assert!(select_datasets(&config, &["MYD99A9.006".to_string()]).is_err());
        Ok(())
    }

    #[test]
    fn test_stations_rejects_missing_input_dir() {
        let result = run_stations(
            &AppConfig::default(),
            Path::new("/definitely/not/here"),
            Path::new("/tmp/station_list.csv"),
            OutputFormat::Csv,
            "snappy",
            true,
        );
        assert!(result.is_err());
    }
}
