//! Owned single-channel f32 grid in row-major layout (stride == width).
//!
//! Used for every numeric grid in a run: luminance, edge strength,
//! importance and coverage. Rows are contiguous, so the whole buffer is also
//! addressable through linear indices `y * w + x`.
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every pixel set to `value`.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }

    /// Build a grid from nested rows, rejecting empty or ragged input.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, ConfigError> {
        let h = rows.len();
        let w = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if h == 0 || w == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let mut data = Vec::with_capacity(w * h);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != w {
                return Err(ConfigError::RaggedGrid {
                    row,
                    expected: w,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self { w, h, data })
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// `(width, height)` pair, handy for shape checks and error reporting.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    pub fn same_shape(&self, other: &ImageF32) -> bool {
        self.shape() == other.shape()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(0.0f32, f32::max)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.w;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![0.0, 1.0], vec![0.5]];
        assert_eq!(
            ImageF32::from_rows(&rows),
            Err(ConfigError::RaggedGrid {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn from_rows_rejects_empty_input() {
        let rows: Vec<Vec<f32>> = Vec::new();
        assert_eq!(ImageF32::from_rows(&rows), Err(ConfigError::EmptyGrid));
        let rows: Vec<Vec<f32>> = vec![Vec::new()];
        assert_eq!(ImageF32::from_rows(&rows), Err(ConfigError::EmptyGrid));
    }

    #[test]
    fn from_rows_is_row_major() {
        let img = ImageF32::from_rows(&[[0.0, 0.1, 0.2], [1.0, 1.1, 1.2]]).unwrap();
        assert_eq!(img.shape(), (3, 2));
        assert_eq!(img.get(2, 1), 1.2);
        assert_eq!(img.data[img.idx(1, 0)], 0.1);
    }
}
