//! CSV report of the latest analysis.
//!
//! The report lives at a fixed path and is overwritten by every analysis,
//! so concurrent analyses race on it and the last writer wins.
//!
//! Layout:
//!
//! ```text
//! Land Type,sandbar
//! Greenness Index,0.0213
//! Weather,haze; 29.4°C; 79% humidity; 0 mm rain (1h)
//!
//! Suggestions,Estimated Cost
//! Drought-resistant plants,Rainwater Tank: ₹2500
//! Rainwater harvesting,Solar Panels per acre: ₹500000
//! ```

use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::analysis::AnalysisResult;

/// Default report location, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "report.csv";

/// Rows preceding the suggestion rows (three metadata rows, a blank row, a header row).
pub const REPORT_HEADER_ROWS: usize = 5;

pub const CURRENCY_PREFIX: &str = "₹";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write `result` to `path`, replacing any previous report.
///
/// One row per suggestion/cost pair, truncated to the shorter of the two
/// lists (see [`SuggestionSet::pairs`](crate::suggestion::SuggestionSet::pairs)).
pub fn write_report(path: &Path, result: &AnalysisResult) -> Result<(), ReportError> {
    let display = path.display().to_string();
    let csv_err = |source: csv::Error| ReportError::Csv {
        path: display.clone(),
        source,
    };
    let io_err = |source: std::io::Error| ReportError::Io {
        path: display.clone(),
        source,
    };

    let mut file = File::create(path).map_err(io_err)?;

    let mut wtr = WriterBuilder::new().from_writer(&mut file);
    wtr.write_record(["Land Type", result.land_type.as_str()])
        .map_err(csv_err)?;
    wtr.write_record(["Greenness Index", &result.greenness_index.to_string()])
        .map_err(csv_err)?;
    wtr.write_record(["Weather", &result.weather.to_string()])
        .map_err(csv_err)?;
    wtr.flush().map_err(io_err)?;
    drop(wtr);

    // csv writes an empty record as `""`, so the blank separator goes straight to the file
    file.write_all(b"\n").map_err(io_err)?;

    let mut wtr = WriterBuilder::new().from_writer(&mut file);
    wtr.write_record(["Suggestions", "Estimated Cost"])
        .map_err(csv_err)?;
    for (suggestion, (item, cost)) in result.advice.pairs() {
        let estimate = format!("{}: {}{}", item, CURRENCY_PREFIX, cost);
        wtr.write_record([suggestion, estimate.as_str()])
            .map_err(csv_err)?;
    }
    wtr.flush().map_err(io_err)?;
    Ok(())
}
