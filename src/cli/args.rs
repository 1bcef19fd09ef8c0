use crate::utils::constants::COMPRESSION_SNAPPY;
use crate::writers::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meteo-processor")]
#[command(about = "Météo-France station aggregation and MODIS tile harvesting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Only log warnings and hide progress bars")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Configuration file (TOML, YAML or JSON); METEO__* variables override it"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the station list from a directory of regional observation files
    Stations {
        #[arg(short, long, help = "Directory containing region<N> subdirectories")]
        input_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: <input-dir>/station_list.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        #[arg(
            short,
            long,
            default_value = COMPRESSION_SNAPPY,
            help = "Parquet compression (snappy, gzip, lz4, zstd, none)"
        )]
        compression: String,
    },

    /// Download MODIS tiles for the configured datasets
    Harvest {
        #[arg(short, long, help = "Tile root directory [default: from configuration]")]
        output_dir: Option<PathBuf>,

        #[arg(short, long, help = "Only harvest the named dataset (repeatable)")]
        dataset: Vec<String>,

        #[arg(long, help = "List matching tiles without downloading")]
        dry_run: bool,
    },

    /// List the configured datasets
    Datasets,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stations() {
        let cli = Cli::parse_from([
            "meteo-processor",
            "stations",
            "--input-dir",
            "data",
            "--format",
            "parquet",
            "-v",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Stations {
                input_dir,
                output_file,
                format,
                compression,
            } => {
                assert_eq!(input_dir, PathBuf::from("data"));
                assert!(output_file.is_none());
                assert_eq!(format, OutputFormat::Parquet);
                assert_eq!(compression, "snappy");
            }
            _ => panic!("expected stations command"),
        }
    }

    #[test]
    fn test_parse_harvest_datasets() {
        let cli = Cli::parse_from([
            "meteo-processor",
            "harvest",
            "--dataset",
            "MYD11A1.006",
            "--dataset",
            "MOD10A1.006",
            "--dry-run",
        ]);

        match cli.command {
            Commands::Harvest {
                dataset, dry_run, ..
            } => {
                assert_eq!(dataset, vec!["MYD11A1.006", "MOD10A1.006"]);
                assert!(dry_run);
            }
            _ => panic!("expected harvest command"),
        }
    }
}
