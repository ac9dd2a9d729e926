//! Preview rendering of a chord sequence.
//!
//! Pins live in importance-grid coordinates; the renderer maps them onto a
//! square `size × size` canvas with independent x/y scale factors and draws
//! every segment as a straight stroke.
use crate::image::io::ensure_parent_dir;
use crate::pins::PinLayout;
use crate::sequence::Sequence;
use chrono::Local;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use log::warn;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Canvas edge length in pixels.
    pub size: u32,
    /// Stroke width in pixels (parallel 1px strokes).
    pub line_width: u32,
    pub background: [u8; 3],
    pub line_color: [u8; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 800,
            line_width: 1,
            background: [255, 255, 255],
            line_color: [0, 0, 0],
        }
    }
}

/// Grid-to-canvas transform for a `grid_w × grid_h` grid.
pub fn canvas_transform(grid_w: usize, grid_h: usize, size: u32) -> Matrix3<f32> {
    let sx = size as f32 / grid_w.max(1) as f32;
    let sy = size as f32 / grid_h.max(1) as f32;
    Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0)
}

fn to_canvas(m: &Matrix3<f32>, p: [f32; 2]) -> (f32, f32) {
    let v = m * Vector3::new(p[0], p[1], 1.0);
    (v[0], v[1])
}

/// Draw `sequence` over `pins` laid out on a `grid_w × grid_h` grid.
///
/// Segments that do not join two distinct pins of the layout are skipped.
pub fn render_sequence(
    pins: &PinLayout,
    sequence: &Sequence,
    grid_w: usize,
    grid_h: usize,
    options: &RenderOptions,
) -> RgbImage {
    let size = options.size.max(1);
    let mut canvas = RgbImage::from_pixel(size, size, Rgb(options.background));
    let color = Rgb(options.line_color);
    let m = canvas_transform(grid_w, grid_h, size);
    let width = options.line_width.max(1);

    let mut skipped = 0usize;
    for seg in sequence {
        if !seg.fits(pins.len()) {
            skipped += 1;
            continue;
        }
        let a = to_canvas(&m, pins.point(seg.from));
        let b = to_canvas(&m, pins.point(seg.to));
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        let normal = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 0.0) };
        for k in 0..width {
            let off = k as f32 - (width - 1) as f32 / 2.0;
            let (ox, oy) = (normal.0 * off, normal.1 * off);
            // the line drawer truncates endpoints; snap them to the nearest pixel
            let start = ((a.0 + ox).round(), (a.1 + oy).round());
            let end = ((b.0 + ox).round(), (b.1 + oy).round());
            draw_line_segment_mut(&mut canvas, start, end, color);
        }
    }
    if skipped > 0 {
        warn!(
            "Render: skipped {} segment(s) not valid for {} pins",
            skipped,
            pins.len()
        );
    }
    canvas
}

/// Save as PNG, replacing any other extension. Returns the written path.
pub fn save_render(image: &RgbImage, path: &Path) -> Result<PathBuf, String> {
    let path = path.with_extension("png");
    ensure_parent_dir(&path)?;
    image
        .save(&path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))?;
    Ok(path)
}

/// `dir/string_art_YYYYmmdd-HHMMSS.png` in local time.
pub fn timestamped_output_path(dir: &Path) -> PathBuf {
    dir.join(format!("string_art_{}.png", Local::now().format("%Y%m%d-%H%M%S")))
}
