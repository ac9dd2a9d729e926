//! Pin placement on a circle.
//!
//! Pin `k` of `n` sits at angle `2π·k/n` measured from the +x axis in image
//! coordinates (y grows downwards). Indices are stable for the lifetime of a
//! layout and define the scan order used by the selector's tie-break.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Fixed, ordered set of pin coordinates on a circle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinLayout {
    center: [f32; 2],
    radius: f32,
    points: Vec<[f32; 2]>,
}

impl PinLayout {
    /// Place `count` equispaced pins on the circle `(center, radius)`.
    pub fn generate(center: [f32; 2], radius: f32, count: usize) -> Result<Self, ConfigError> {
        if count < 2 {
            return Err(ConfigError::TooFewPins { count });
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::InvalidRadius(radius));
        }
        if !(center[0].is_finite() && center[1].is_finite()) {
            return Err(ConfigError::InvalidCenter(center[0], center[1]));
        }
        let points = (0..count)
            .map(|k| {
                let theta = TAU * k as f32 / count as f32;
                [
                    center[0] + radius * theta.cos(),
                    center[1] + radius * theta.sin(),
                ]
            })
            .collect();
        Ok(Self {
            center,
            radius,
            points,
        })
    }

    /// Circle inscribed in a `width × height` grid, one pixel inside the border.
    ///
    /// Center is `(width / 2, height / 2)` in integer pixels and the radius is
    /// `min(width, height) / 2 - 1`, so every rounded pin lies inside the grid.
    pub fn inscribed(width: usize, height: usize, count: usize) -> Result<Self, ConfigError> {
        let radius = (width.min(height) / 2) as f32 - 1.0;
        let center = [(width / 2) as f32, (height / 2) as f32];
        Self::generate(center, radius, count)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    #[inline]
    pub fn point(&self, k: usize) -> [f32; 2] {
        self.points[k]
    }

    /// Pin `k` rounded to the nearest integer pixel.
    #[inline]
    pub fn pixel(&self, k: usize) -> [i64; 2] {
        let [x, y] = self.points[k];
        [x.round() as i64, y.round() as i64]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_are_on_circle_and_equispaced() {
        for count in [2usize, 3, 4, 7, 64, 301] {
            let layout = PinLayout::generate([50.0, 40.0], 30.0, count).unwrap();
            assert_eq!(layout.len(), count);
            let step = TAU / count as f32;
            for (k, p) in layout.points().iter().enumerate() {
                let dx = p[0] - 50.0;
                let dy = p[1] - 40.0;
                let dist = (dx * dx + dy * dy).sqrt();
                assert!((dist - 30.0).abs() < 1e-3, "pin {k} at distance {dist}");
                let angle = dy.atan2(dx).rem_euclid(TAU);
                let expected = step * k as f32;
                let diff = (angle - expected).abs();
                let diff = diff.min(TAU - diff);
                assert!(diff < 1e-3, "pin {k} angle {angle} expected {expected}");
            }
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(
            PinLayout::generate([0.0, 0.0], 1.0, 1),
            Err(ConfigError::TooFewPins { count: 1 })
        );
        assert_eq!(
            PinLayout::generate([0.0, 0.0], 0.0, 4),
            Err(ConfigError::InvalidRadius(0.0))
        );
        assert!(PinLayout::generate([0.0, 0.0], f32::NAN, 4).is_err());
        assert!(matches!(
            PinLayout::generate([f32::NAN, 0.0], 5.0, 4),
            Err(ConfigError::InvalidCenter(..))
        ));
        assert_eq!(
            PinLayout::generate([0.0, f32::INFINITY], 5.0, 4),
            Err(ConfigError::InvalidCenter(0.0, f32::INFINITY))
        );
        assert!(PinLayout::inscribed(2, 2, 8).is_err());
    }

    #[test]
    fn inscribed_cardinal_pins_round_to_expected_pixels() {
        let layout = PinLayout::inscribed(10, 10, 4).unwrap();
        assert_eq!(layout.center(), [5.0, 5.0]);
        assert_eq!(layout.radius(), 4.0);
        let pixels: Vec<_> = (0..4).map(|k| layout.pixel(k)).collect();
        assert_eq!(pixels, vec![[9, 5], [5, 9], [1, 5], [5, 1]]);
    }
}
