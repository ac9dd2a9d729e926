use thiserror::Error;

/// Invalid construction parameters.
///
/// Raised while setting a run up, before any state is mutated. Once the
/// selector is constructed nothing in the generation loop can fail.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("at least 2 pins are required, got {count}")]
    TooFewPins { count: usize },

    #[error("pin circle radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("pin circle center must be finite, got ({0}, {1})")]
    InvalidCenter(f32, f32),

    #[error("max_lines must be at least 1")]
    ZeroMaxLines,

    #[error("acceptance threshold must be finite and >= 0, got {0}")]
    InvalidThreshold(f64),

    #[error("start pin {start} is out of range for {count} pins")]
    StartPinOutOfRange { start: usize, count: usize },

    #[error("configured pin_count {configured} does not match the pin layout ({layout} pins)")]
    PinCountMismatch { configured: usize, layout: usize },

    #[error("multiplicative coverage gamma must lie in (0, 1), got {0}")]
    InvalidGamma(f32),

    #[error("grid is empty")]
    EmptyGrid,

    #[error("grid is not rectangular: row {row} has {found} values, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid shape mismatch: expected {expected:?} (w, h), found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("grid value at ({x}, {y}) must be finite and non-negative")]
    InvalidValue { x: usize, y: usize },

    #[error("edge weight must lie in [0, 1], got {0}")]
    InvalidEdgeWeight(f32),

    #[error("segment {step} ({from} -> {to}) is not a chord of a {pin_count}-pin layout")]
    InvalidSegment {
        step: usize,
        from: usize,
        to: usize,
        pin_count: usize,
    },

    #[error("logarithmic epsilon must lie in (0, 1), got {0}")]
    InvalidEpsilon(f32),
}
