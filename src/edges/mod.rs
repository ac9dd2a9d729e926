//! Edge strength for edge-weighted importance maps.
//!
//! - Gradient computation (Sobel/Scharr) over a luminance grid with border
//!   clamping (replicate).
//! - `edge_strength` folds the gradient magnitude into [0, 1] by dividing by
//!   its maximum, so it can be blended with inverted luminance.

pub mod grad;

pub use grad::{edge_strength, scharr_gradients, sobel_gradients, EdgeKernel, Grad};
