//! One-shot analysis of an image file from disk.

use anyhow::Context;
use bytes::Bytes;
use log::info;
use std::path::Path;

use crate::config::AnalyzerArgs;

/// Analyze `image` with the same pipeline the server uses and print the
/// JSON result to stdout. The report file is written as usual.
pub async fn run_analyze(image: &Path, analyzer: AnalyzerArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let service = analyzer.build_service()?;

    info!("Analyzing {}", image.display());
    let result = service
        .analyze(Bytes::from(bytes))
        .await
        .with_context(|| format!("Failed to analyze {}", image.display()))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
