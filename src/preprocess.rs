//! Source image preparation: decode, optional circular crop, resize, and
//! conversion to a luminance grid in [0, 1].
//!
//! Errors are plain strings, like the rest of the file-facing helpers.
use crate::image::io::GrayImageU8;
use crate::image::ImageF32;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Selection circle in source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleCrop {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

impl CircleCrop {
    /// Largest circle inscribed in a `width × height` image.
    pub fn inscribed(width: u32, height: u32) -> Self {
        Self {
            cx: (width / 2) as f32,
            cy: (height / 2) as f32,
            radius: (width.min(height) / 2) as f32 - 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Length of the longer side after resizing.
    pub target_size: u32,
    /// Crop to the square bounding this circle before resizing.
    pub crop: Option<CircleCrop>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            target_size: 500,
            crop: None,
        }
    }
}

/// Open `path` and run [`preprocess_image`] on it.
pub fn load_luminance(path: &Path, options: &PreprocessOptions) -> Result<ImageF32, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    preprocess_image(img, options)
}

pub fn preprocess_image(
    img: DynamicImage,
    options: &PreprocessOptions,
) -> Result<ImageF32, String> {
    if options.target_size == 0 {
        return Err("target_size must be at least 1".to_string());
    }
    let mut gray = img.into_luma8();
    if let Some(crop) = options.crop {
        gray = crop_to_circle(&gray, crop)?;
    }
    let resized = resize_longer_side(&gray, options.target_size);
    debug!(
        "Preprocess: {}x{} -> {}x{} (crop={:?})",
        gray.width(),
        gray.height(),
        resized.width(),
        resized.height(),
        options.crop
    );
    Ok(GrayImageU8::from_gray_image(resized).as_view().to_luminance())
}

/// Square bounding `crop`, clamped to the image.
pub fn crop_to_circle(gray: &GrayImage, crop: CircleCrop) -> Result<GrayImage, String> {
    let finite = crop.radius.is_finite() && crop.cx.is_finite() && crop.cy.is_finite();
    if !(finite && crop.radius > 0.0) {
        return Err(format!("Invalid crop circle {crop:?}"));
    }
    let (w, h) = (gray.width() as f32, gray.height() as f32);
    let x0 = (crop.cx - crop.radius).floor().clamp(0.0, w);
    let y0 = (crop.cy - crop.radius).floor().clamp(0.0, h);
    let x1 = (crop.cx + crop.radius).ceil().clamp(0.0, w);
    let y1 = (crop.cy + crop.radius).ceil().clamp(0.0, h);
    if x1 <= x0 || y1 <= y0 {
        return Err(format!(
            "Crop circle {crop:?} lies outside the {}x{} image",
            gray.width(),
            gray.height()
        ));
    }
    let (cw, ch) = ((x1 - x0) as u32, (y1 - y0) as u32);
    Ok(imageops::crop_imm(gray, x0 as u32, y0 as u32, cw, ch).to_image())
}

/// Lanczos resize so that `max(width, height) == target`.
pub fn resize_longer_side(gray: &GrayImage, target: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let longer = w.max(h).max(1);
    let scale = target as f64 / longer as f64;
    let nw = ((w as f64 * scale) as u32).max(1);
    let nh = ((h as f64 * scale) as u32).max(1);
    imageops::resize(gray, nw, nh, FilterType::Lanczos3)
}
