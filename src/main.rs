mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    hrun::logger::init_logger();

    let cli = Cli::parse();
    cli::run(cli).await
}
