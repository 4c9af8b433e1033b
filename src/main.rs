use clap::Parser;
use trip_processor::cli::{run, Cli};
use trip_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
