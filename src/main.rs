use clap::Parser;
use meteo_processor::cli::{run, Cli};
use meteo_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
