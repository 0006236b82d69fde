use image::imageops::{self, FilterType};
use image::{ImageResult, RgbImage};

pub use image::ImageError;

/// Side length of the square grid fed to both the classifier and the
/// greenness estimator.
pub const INPUT_SIZE: u32 = 224;

/// Guards the green/red ratio against a zero denominator on black pixels.
const GREENNESS_EPSILON: f64 = 1e-5;

/// Decode an uploaded image and resize it to `INPUT_SIZE`×`INPUT_SIZE` RGB.
///
/// The format is sniffed from the bytes; alpha and grayscale inputs are
/// converted to RGB. Aspect ratio is not preserved.
pub fn decode_and_resize(bytes: &[u8]) -> ImageResult<RgbImage> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    if rgb.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
        return Ok(rgb);
    }
    Ok(imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom))
}

/// Mean of `(g - r) / (g + r + ε)` over all pixels.
///
/// A coarse vegetation proxy in roughly `[-1, 1]`: positive where green
/// dominates red, zero for gray, negative for red/brown soil. Not
/// calibrated against any sensor. An empty image yields `0.0`.
pub fn greenness_index(pixels: &RgbImage) -> f64 {
    let count = pixels.width() as u64 * pixels.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let total: f64 = pixels
        .pixels()
        .map(|p| {
            let red = p[0] as f64;
            let green = p[1] as f64;
            (green - red) / (green + red + GREENNESS_EPSILON)
        })
        .sum();
    total / count as f64
}
