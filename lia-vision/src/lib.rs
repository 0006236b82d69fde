//! Pixel-level work for the land improvement advisor.
//!
//! - [`imaging`]: decoding uploads into the fixed 224×224 RGB grid and the
//!   greenness index computed on it
//! - [`classifier`]: the [`LandClassifier`] seam and its ONNX implementation

pub mod classifier;
pub mod imaging;

pub use classifier::{LandClassifier, ModelError, Normalization, OnnxClassifier};
pub use imaging::{decode_and_resize, greenness_index, INPUT_SIZE};
