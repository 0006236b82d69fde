//! One analysis, start to finish.
//!
//! decode → classify → greenness → weather → suggestions → report.
//! Steps run strictly in that order. Weather never fails (it degrades to
//! the unavailable snapshot); any other failure aborts the request and no
//! partial result is returned.

use bytes::Bytes;
use lia_core::report::{write_report, ReportError};
use lia_core::weather::WeatherClient;
use lia_core::{suggest, AnalysisResult};
use lia_vision::imaging::ImageError;
use lia_vision::{decode_and_resize, greenness_index, LandClassifier, ModelError};
use log::{debug, info};
use std::sync::Arc;

use crate::config::AnalyzerConfig;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("could not decode image: {0}")]
    Decode(#[from] ImageError),
    #[error("classification failed: {0}")]
    Classify(#[from] ModelError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Shared, read-only analysis pipeline.
///
/// Cloning is cheap; the classifier is behind an `Arc` and is used
/// concurrently by all requests without locking.
#[derive(Clone)]
pub struct AnalysisService {
    classifier: Arc<dyn LandClassifier>,
    weather: WeatherClient,
    config: AnalyzerConfig,
}

impl AnalysisService {
    pub fn new(
        classifier: Arc<dyn LandClassifier>,
        weather: WeatherClient,
        config: AnalyzerConfig,
    ) -> Self {
        AnalysisService {
            classifier,
            weather,
            config,
        }
    }

    /// Analyze one uploaded image.
    pub async fn analyze(&self, image: Bytes) -> Result<AnalysisResult, AnalysisError> {
        debug!("Analyzing {} byte upload", image.len());

        // Decoding and inference are CPU bound; keep them off the async workers
        let classifier = Arc::clone(&self.classifier);
        let (classification, greenness) =
            tokio::task::spawn_blocking(move || -> Result<_, AnalysisError> {
                let pixels = decode_and_resize(&image)?;
                let classification = classifier.classify(&pixels)?;
                let greenness = greenness_index(&pixels);
                Ok((classification, greenness))
            })
            .await??;
        debug!(
            "Classified as {} ({:.3}), greenness {:.4}",
            classification.label, classification.confidence, greenness
        );

        let weather = self
            .weather
            .fetch(self.config.latitude, self.config.longitude, &self.config.api_key)
            .await;

        let advice = suggest(&classification.label, greenness);
        let result = AnalysisResult::new(classification, greenness, weather, advice);

        write_report(&self.config.report_path, &result)?;

        info!(
            "Analysis complete: {} (confidence {:.3}, greenness {:.4}), {} suggestions, report {}",
            result.land_type,
            result.confidence,
            result.greenness_index,
            result.advice.suggestions.len(),
            self.config.report_path.display()
        );
        Ok(result)
    }
}
