//! Land improvement advisor - analyze land photos over HTTP or from the command line.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "lia",
    version,
    about = "Classify land photos and suggest improvements with cost estimates"
)]
struct Cli {
    #[command(subcommand)]
    command: lia_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    lia_cmd::run(cli.command).await
}
