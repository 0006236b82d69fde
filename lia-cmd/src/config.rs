//! Analyzer configuration.
//!
//! Every option is a command-line flag with an `LIA_*` environment
//! fallback. The site coordinate has no default: weather is only meaningful
//! for the place the photo was taken.

use anyhow::Context;
use clap::Args;
use lia_core::report::DEFAULT_REPORT_PATH;
use lia_core::weather::{WeatherClient, DEFAULT_WEATHER_URL};
use lia_vision::{LandClassifier, Normalization, OnnxClassifier};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crate::service::AnalysisService;

#[derive(Args, Debug, Clone)]
pub struct AnalyzerArgs {
    /// Latitude of the site, in decimal degrees
    #[arg(long, env = "LIA_LATITUDE", allow_hyphen_values = true)]
    pub latitude: f64,

    /// Longitude of the site, in decimal degrees
    #[arg(long, env = "LIA_LONGITUDE", allow_hyphen_values = true)]
    pub longitude: f64,

    /// OpenWeatherMap API key; weather is reported as unavailable when empty
    #[arg(long, env = "LIA_WEATHER_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Current-weather endpoint
    #[arg(long, env = "LIA_WEATHER_URL", default_value = DEFAULT_WEATHER_URL)]
    pub weather_url: String,

    /// Report file, overwritten after every analysis
    #[arg(long, env = "LIA_REPORT_PATH", default_value = DEFAULT_REPORT_PATH)]
    pub report_path: PathBuf,

    /// ONNX image classifier (1x3x224x224 f32 input)
    #[arg(long, env = "LIA_MODEL")]
    pub model: PathBuf,

    /// Class labels for the model, one per line
    #[arg(long, env = "LIA_LABELS")]
    pub labels: PathBuf,

    /// Pixel normalization expected by the model: imagenet or symmetric
    #[arg(long, env = "LIA_NORMALIZATION", default_value_t = Normalization::Imagenet)]
    pub normalization: Normalization,
}

/// Per-request settings of the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub api_key: String,
    pub weather_url: String,
    pub report_path: PathBuf,
}

impl AnalyzerConfig {
    /// Reject coordinates outside the valid latitude/longitude ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            anyhow::bail!("latitude {} is outside [-90, 90]", self.latitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            anyhow::bail!("longitude {} is outside [-180, 180]", self.longitude);
        }
        Ok(())
    }
}

impl From<&AnalyzerArgs> for AnalyzerConfig {
    fn from(args: &AnalyzerArgs) -> Self {
        AnalyzerConfig {
            latitude: args.latitude,
            longitude: args.longitude,
            api_key: args.api_key.clone(),
            weather_url: args.weather_url.clone(),
            report_path: args.report_path.clone(),
        }
    }
}

impl AnalyzerArgs {
    /// Validate the configuration, load the model and assemble the service.
    pub fn build_service(&self) -> anyhow::Result<AnalysisService> {
        let config = AnalyzerConfig::from(self);
        config.validate()?;

        let classifier = OnnxClassifier::load(&self.model, &self.labels, self.normalization)
            .with_context(|| format!("Failed to load classifier {}", self.model.display()))?;
        let classifier: Arc<dyn LandClassifier> = Arc::new(classifier);
        let weather = WeatherClient::new(config.weather_url.clone());
        info!(
            "Weather for ({}, {}) from {}, report at {}",
            config.latitude,
            config.longitude,
            weather.base_url(),
            config.report_path.display()
        );

        Ok(AnalysisService::new(classifier, weather, config))
    }
}
