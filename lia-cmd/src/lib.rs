//! Command implementations for the land improvement advisor.
//!
//! Both subcommands drive the same [`AnalysisService`]: `serve` exposes it
//! as `POST /analyze`, `analyze` runs it once on a file from disk.

use clap::Subcommand;
use std::path::PathBuf;

pub mod analyze;
pub mod config;
pub mod serve;
pub mod service;

pub use config::{AnalyzerArgs, AnalyzerConfig};
pub use service::{AnalysisError, AnalysisService};

#[derive(Subcommand)]
pub enum Command {
    /// Serve the analysis endpoint over HTTP
    Serve {
        /// Port to listen on (all interfaces)
        #[arg(short, long, env = "LIA_PORT", default_value_t = 8000)]
        port: u16,

        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },

    /// Analyze a single image file and print the result as JSON
    Analyze {
        /// Path to the image to analyze
        image: PathBuf,

        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve { port, analyzer } => serve::run_serve(port, analyzer).await,
        Command::Analyze { image, analyzer } => analyze::run_analyze(&image, analyzer).await,
    }
}
