//! Coverage tracking: ink already placed by committed chords.
//!
//! Coverage starts at zero and only grows. Every update is capped by the
//! importance of the pixel, so `0 <= coverage <= importance` holds after any
//! sequence of updates and revisiting a saturated pixel is a no-op.
use crate::error::ConfigError;
use crate::image::ImageF32;
use crate::importance::ImportanceMap;
use serde::{Deserialize, Serialize};

/// How a chord adds ink to the pixels it crosses.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverageModel {
    /// `coverage = min(coverage + 1, importance)`
    #[default]
    Additive,
    /// Remaining canvas brightness is multiplied by `gamma` on every pass,
    /// tracked as darkness: `c = min(c + (1 - gamma)(1 - c), importance)`.
    Multiplicative { gamma: f32 },
}

impl CoverageModel {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            CoverageModel::Additive => Ok(()),
            CoverageModel::Multiplicative { gamma } if gamma > 0.0 && gamma < 1.0 => Ok(()),
            CoverageModel::Multiplicative { gamma } => Err(ConfigError::InvalidGamma(gamma)),
        }
    }

    #[inline]
    fn apply(&self, coverage: f32, cap: f32) -> f32 {
        let next = match *self {
            CoverageModel::Additive => coverage + 1.0,
            CoverageModel::Multiplicative { gamma } => {
                coverage + (1.0 - gamma) * (1.0 - coverage).max(0.0)
            }
        };
        next.min(cap).max(coverage)
    }
}

/// Anything able to report how much ink a pixel still wants.
///
/// Scoring is phrased purely in terms of this quantity, so alternative
/// coverage models plug in without touching the selector.
pub trait Demand {
    /// Remaining demand at linear pixel index `idx`; never negative.
    fn remaining_demand(&self, idx: usize) -> f32;
}

/// Mutable coverage grid paired with the importance map it is capped by.
#[derive(Clone, Debug)]
pub struct CoverageTracker<'a> {
    importance: &'a ImportanceMap,
    coverage: ImageF32,
    model: CoverageModel,
}

impl<'a> CoverageTracker<'a> {
    pub fn new(importance: &'a ImportanceMap, model: CoverageModel) -> Result<Self, ConfigError> {
        let coverage = ImageF32::new(importance.width(), importance.height());
        Self::with_coverage(importance, coverage, model)
    }

    /// Resume from an existing coverage grid (e.g. a previous partial run).
    ///
    /// The grid must have the importance map's shape; values are clamped into
    /// `[0, importance]` so the cap invariant holds from the start.
    pub fn with_coverage(
        importance: &'a ImportanceMap,
        mut coverage: ImageF32,
        model: CoverageModel,
    ) -> Result<Self, ConfigError> {
        model.validate()?;
        if coverage.shape() != importance.shape()
            || coverage.data.len() != importance.values().len()
        {
            return Err(ConfigError::ShapeMismatch {
                expected: importance.shape(),
                found: coverage.shape(),
            });
        }
        for (c, &cap) in coverage.data.iter_mut().zip(importance.values()) {
            *c = if c.is_finite() { c.clamp(0.0, cap) } else { 0.0 };
        }
        Ok(Self {
            importance,
            coverage,
            model,
        })
    }

    pub fn model(&self) -> CoverageModel {
        self.model
    }

    pub fn importance(&self) -> &ImportanceMap {
        self.importance
    }

    pub fn coverage(&self) -> &ImageF32 {
        &self.coverage
    }

    pub fn into_coverage(self) -> ImageF32 {
        self.coverage
    }

    /// Add one chord's worth of ink to each listed pixel (linear indices).
    pub fn update(&mut self, pixels: &[u32]) {
        let caps = self.importance.values();
        for &idx in pixels {
            let i = idx as usize;
            self.coverage.data[i] = self.model.apply(self.coverage.data[i], caps[i]);
        }
    }

    /// `Σ |importance - coverage|` over the whole grid.
    pub fn residual_l1(&self) -> f64 {
        self.importance
            .values()
            .iter()
            .zip(&self.coverage.data)
            .map(|(&imp, &cov)| (imp - cov).abs() as f64)
            .sum()
    }
}

impl Demand for CoverageTracker<'_> {
    #[inline]
    fn remaining_demand(&self, idx: usize) -> f32 {
        (self.importance.values()[idx] - self.coverage.data[idx]).max(0.0)
    }
}
