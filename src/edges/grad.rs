//! Image gradients (Sobel/Scharr) and normalised edge strength.
//!
//! - Convolves a 3×3 kernel pair (`X` and `Y`) with border clamping.
//! - Outputs per-pixel `gx`, `gy`, `mag = sqrt(gx^2+gy^2)`.
//!
//! Complexity: O(W·H) per pass; memory: three float buffers.
use crate::image::{ImageF32, ImageView, ImageViewMut};
use serde::{Deserialize, Serialize};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const SCHARR_KERNEL_X: Kernel3 = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_KERNEL_Y: Kernel3 = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];

/// Derivative kernel used for edge strength.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKernel {
    #[default]
    Sobel,
    /// Better rotational symmetry than Sobel.
    Scharr,
}

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: ImageF32,
    /// Euclidean magnitude per pixel: `sqrt(gx^2 + gy^2)`
    pub mag: ImageF32,
}

fn gradients_with_kernels(l: &ImageF32, kernel_x: &Kernel3, kernel_y: &Kernel3) -> Grad {
    let (w, h) = l.shape();
    let mut grad = Grad {
        gx: ImageF32::new(w, h),
        gy: ImageF32::new(w, h),
        mag: ImageF32::new(w, h),
    };
    if w == 0 || h == 0 {
        return grad;
    }

    for y in 0..h {
        let rows = [
            l.row(y.saturating_sub(1)),
            l.row(y),
            l.row((y + 1).min(h - 1)),
        ];
        let mut sums_x = vec![0.0f32; w];
        let mut sums_y = vec![0.0f32; w];
        for (ky, src) in rows.iter().enumerate() {
            let kx_row = &kernel_x[ky];
            let ky_row = &kernel_y[ky];
            for x in 0..w {
                let taps = [src[x.saturating_sub(1)], src[x], src[(x + 1).min(w - 1)]];
                sums_x[x] += taps[0] * kx_row[0] + taps[1] * kx_row[1] + taps[2] * kx_row[2];
                sums_y[x] += taps[0] * ky_row[0] + taps[1] * ky_row[1] + taps[2] * ky_row[2];
            }
        }
        grad.gx.row_mut(y).copy_from_slice(&sums_x);
        grad.gy.row_mut(y).copy_from_slice(&sums_y);
        for (m, (sx, sy)) in grad.mag.row_mut(y).iter_mut().zip(sums_x.iter().zip(&sums_y)) {
            *m = (sx * sx + sy * sy).sqrt();
        }
    }
    grad
}

/// Compute Sobel gradients on a single-channel float image.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    gradients_with_kernels(l, &SOBEL_KERNEL_X, &SOBEL_KERNEL_Y)
}

/// Compute Scharr gradients.
pub fn scharr_gradients(l: &ImageF32) -> Grad {
    gradients_with_kernels(l, &SCHARR_KERNEL_X, &SCHARR_KERNEL_Y)
}

/// Gradient magnitude scaled into [0, 1] by its maximum.
///
/// A flat image (or one with non-finite magnitudes only) yields all zeros.
pub fn edge_strength(l: &ImageF32, kernel: EdgeKernel) -> ImageF32 {
    let mut mag = match kernel {
        EdgeKernel::Sobel => sobel_gradients(l).mag,
        EdgeKernel::Scharr => scharr_gradients(l).mag,
    };
    let max = mag.max_value();
    if !(max.is_finite() && max > 0.0) {
        return ImageF32::new(mag.w, mag.h);
    }
    let inv = 1.0 / max;
    for v in mag.data.iter_mut() {
        *v = if v.is_finite() { (*v * inv).clamp(0.0, 1.0) } else { 0.0 };
    }
    mag
}
