//! Land type classification.
//!
//! The pretrained network is an ImageNet classifier; its scene/object label
//! is used as a stand-in for the terrain category. The model is loaded once
//! at startup and shared read-only between requests: [`OnnxClassifier`]
//! holds an optimized tract plan, and running it only needs `&self`.

use image::imageops::{self, FilterType};
use image::RgbImage;
use lia_core::ClassificationResult;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tract_onnx::prelude::*;

use crate::imaging::INPUT_SIZE;

/// Number of top predictions considered per image.
pub const TOP_K: usize = 3;

/// Anything that can name the land type shown in a 224×224 RGB grid.
pub trait LandClassifier: Send + Sync {
    fn classify(&self, pixels: &RgbImage) -> Result<ClassificationResult, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read label file {path}: {source}")]
    Labels {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("label file {0} contains no labels")]
    EmptyLabels(PathBuf),
    #[error("failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Pixel preprocessing expected by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// `(p / 255 - mean) / std` with the ImageNet channel statistics
    #[default]
    Imagenet,
    /// `p / 127.5 - 1`, as used by the Keras MobileNet family
    Symmetric,
}

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

impl Normalization {
    pub fn apply(self, channel: usize, value: u8) -> f32 {
        match self {
            Normalization::Imagenet => {
                (value as f32 / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel]
            }
            Normalization::Symmetric => value as f32 / 127.5 - 1.0,
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "imagenet" => Ok(Normalization::Imagenet),
            "symmetric" | "tf" => Ok(Normalization::Symmetric),
            other => Err(format!(
                "unknown normalization '{}', expected 'imagenet' or 'symmetric'",
                other
            )),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::Imagenet => write!(f, "imagenet"),
            Normalization::Symmetric => write!(f, "symmetric"),
        }
    }
}

/// ONNX image classifier with a fixed `1×3×224×224` f32 input.
pub struct OnnxClassifier {
    model: TypedRunnableModel<TypedModel>,
    labels: Vec<String>,
    normalization: Normalization,
}

impl OnnxClassifier {
    /// Load and optimize the model, and read its label file.
    pub fn load(
        model_path: &Path,
        labels_path: &Path,
        normalization: Normalization,
    ) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(labels_path).map_err(|source| ModelError::Labels {
            path: labels_path.to_path_buf(),
            source,
        })?;
        let labels = parse_labels(&text);
        if labels.is_empty() {
            return Err(ModelError::EmptyLabels(labels_path.to_path_buf()));
        }

        let classifier = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| OnnxClassifier::from_model(model, labels, normalization))
            .map_err(|e| ModelError::Load {
                path: model_path.to_path_buf(),
                message: format!("{:#}", e),
            })?;

        info!(
            "Loaded classifier {} with {} labels ({} normalization)",
            model_path.display(),
            classifier.labels.len(),
            normalization
        );
        Ok(classifier)
    }

    /// Pin the input to `1×3×224×224` f32 and build the runnable plan.
    pub fn from_model(
        model: InferenceModel,
        labels: Vec<String>,
        normalization: Normalization,
    ) -> TractResult<Self> {
        let size = INPUT_SIZE as usize;
        let model = model
            .with_input_fact(0, f32::fact([1, 3, size, size]).into())?
            .into_optimized()?
            .into_runnable()?;

        Ok(OnnxClassifier {
            model,
            labels,
            normalization,
        })
    }

    fn scores(&self, pixels: &RgbImage) -> TractResult<Vec<f32>> {
        let size = INPUT_SIZE as usize;
        let input: Tensor =
            tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
                self.normalization
                    .apply(c, pixels.get_pixel(x as u32, y as u32)[c])
            })
            .into();
        let outputs = self.model.run(tvec!(input.into()))?;
        let scores = outputs[0].to_array_view::<f32>()?.iter().copied().collect();
        Ok(scores)
    }
}

impl LandClassifier for OnnxClassifier {
    fn classify(&self, pixels: &RgbImage) -> Result<ClassificationResult, ModelError> {
        let resized;
        let pixels = if pixels.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
            pixels
        } else {
            resized = imageops::resize(pixels, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
            &resized
        };

        let scores = self
            .scores(pixels)
            .map_err(|e| ModelError::Inference(format!("{:#}", e)))?;
        let probabilities = to_probabilities(&scores);
        let top = top_predictions(&probabilities, TOP_K);

        for (rank, (idx, p)) in top.iter().enumerate() {
            debug!("#{} {} ({:.4})", rank + 1, label_for(&self.labels, scores.len(), *idx), p);
        }

        let (idx, confidence) = top
            .first()
            .copied()
            .ok_or_else(|| ModelError::Inference("model produced no scores".to_string()))?;

        Ok(ClassificationResult {
            label: label_for(&self.labels, scores.len(), idx),
            confidence,
        })
    }
}

/// Parse a label file, one class per line.
///
/// Accepts plain names (`tench`) as well as synset-prefixed lines
/// (`n01440764 tench, Tinca tinca`). Only the first comma-separated name is
/// kept and inner spaces become underscores, so `sea shore` reads
/// `sea_shore`. Blank lines are skipped.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let name = match line.split_once(' ') {
                Some((head, rest)) if is_synset_id(head) => rest,
                _ => line,
            };
            let name = name.split(',').next().unwrap_or(name).trim();
            name.split_whitespace().collect::<Vec<_>>().join("_")
        })
        .collect()
}

fn is_synset_id(token: &str) -> bool {
    token.len() > 1
        && token.starts_with('n')
        && token[1..].chars().all(|c| c.is_ascii_digit())
}

/// Resolve a class index to its label.
///
/// A label file with one entry more than the model has classes carries a
/// leading background class, which is skipped.
fn label_for(labels: &[String], classes: usize, idx: usize) -> String {
    let offset = usize::from(labels.len() == classes + 1);
    labels
        .get(idx + offset)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", idx))
}

/// Turn raw model output into probabilities.
///
/// Outputs that already look like a distribution (non-negative, summing to
/// one) are passed through; anything else is treated as logits.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    if !scores.is_empty() && scores.iter().all(|s| *s >= 0.0) && (sum - 1.0).abs() < 1e-3 {
        return scores.to_vec();
    }
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// The `k` highest entries as `(index, value)`, best first.
pub fn top_predictions(probabilities: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}
