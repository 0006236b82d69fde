//! Core types for the land improvement advisor.
//!
//! This crate holds everything that does not need a model or an image
//! decoder:
//! - [`analysis`]: the per-request result payload
//! - [`suggestion`]: the ordered rule table mapping land type and greenness
//!   to improvement suggestions and cost estimates
//! - [`report`]: the CSV report written after every analysis
//! - [`weather`]: the weather snapshot and (with the `api` feature) the
//!   OpenWeatherMap client

pub mod analysis;
pub mod report;
pub mod suggestion;
pub mod weather;

pub use analysis::{AnalysisResult, ClassificationResult};
pub use suggestion::{suggest, Rule, SuggestionSet};
pub use weather::WeatherSnapshot;
