//! Importance map: how much ink each pixel wants.
//!
//! Built once from a luminance grid in `[0, 1]` (1 = white) and optionally
//! blended with a normalised edge-strength grid. Immutable afterwards.
use crate::error::ConfigError;
use crate::image::ImageF32;
use serde::{Deserialize, Serialize};

/// Luminance inversion model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceModel {
    /// `1 - luminance`
    #[default]
    Linear,
    /// `-ln(clamp(luminance, epsilon, 1))`, amplifies near-black regions.
    Logarithmic,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceOptions {
    pub model: ImportanceModel,
    /// Lower luminance clamp for the logarithmic model.
    pub epsilon: f32,
    /// Weight `α` of the inverted luminance when an edge grid is supplied;
    /// edges get `1 - α`. Ignored without an edge grid.
    pub edge_weight: f32,
}

impl Default for ImportanceOptions {
    fn default() -> Self {
        Self {
            model: ImportanceModel::Linear,
            epsilon: 1e-3,
            edge_weight: 0.7,
        }
    }
}

impl ImportanceOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if !(0.0..=1.0).contains(&self.edge_weight) {
            return Err(ConfigError::InvalidEdgeWeight(self.edge_weight));
        }
        Ok(())
    }

    #[inline]
    fn invert(&self, luminance: f32) -> f32 {
        let l = luminance.clamp(0.0, 1.0);
        match self.model {
            ImportanceModel::Linear => 1.0 - l,
            // max(0) folds the -0.0 produced at l = 1
            ImportanceModel::Logarithmic => (-l.max(self.epsilon).ln()).max(0.0),
        }
    }
}

/// Immutable `H × W` grid of desired ink density (non-negative).
#[derive(Clone, Debug)]
pub struct ImportanceMap {
    grid: ImageF32,
}

impl ImportanceMap {
    /// Build from a luminance grid and an optional edge grid of the same shape.
    pub fn build(
        luminance: &ImageF32,
        edges: Option<&ImageF32>,
        options: &ImportanceOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        if luminance.w == 0 || luminance.h == 0 || luminance.data.len() != luminance.w * luminance.h
        {
            return Err(ConfigError::EmptyGrid);
        }
        if let Some(edges) = edges {
            if !edges.same_shape(luminance) {
                return Err(ConfigError::ShapeMismatch {
                    expected: luminance.shape(),
                    found: edges.shape(),
                });
            }
        }

        if let Some(i) = luminance.data.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                x: i % luminance.w,
                y: i / luminance.w,
            });
        }

        let mut grid = ImageF32::new(luminance.w, luminance.h);
        match edges {
            Some(edges) => {
                let alpha = options.edge_weight;
                for ((dst, &lum), &edge) in grid
                    .data
                    .iter_mut()
                    .zip(&luminance.data)
                    .zip(&edges.data)
                {
                    let edge = if edge.is_finite() { edge.clamp(0.0, 1.0) } else { 0.0 };
                    *dst = alpha * options.invert(lum) + (1.0 - alpha) * edge;
                }
            }
            None => {
                for (dst, &lum) in grid.data.iter_mut().zip(&luminance.data) {
                    *dst = options.invert(lum);
                }
            }
        }
        Ok(Self { grid })
    }

    /// Wrap a ready-made demand grid. Values must be finite and non-negative.
    pub fn from_grid(grid: ImageF32) -> Result<Self, ConfigError> {
        if grid.w == 0 || grid.h == 0 || grid.data.len() != grid.w * grid.h {
            return Err(ConfigError::EmptyGrid);
        }
        if let Some(i) = grid.data.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(ConfigError::InvalidValue {
                x: i % grid.w,
                y: i / grid.w,
            });
        }
        Ok(Self { grid })
    }

    pub fn width(&self) -> usize {
        self.grid.w
    }

    pub fn height(&self) -> usize {
        self.grid.h
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn grid(&self) -> &ImageF32 {
        &self.grid
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.grid.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.grid.get(x, y)
    }

    /// Total demand over the whole grid.
    pub fn total(&self) -> f64 {
        self.grid.sum()
    }
}
