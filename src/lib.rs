#![doc = include_str!("../README.md")]

// Core generation pipeline.
pub mod cancel;
pub mod coverage;
pub mod error;
pub mod importance;
pub mod pins;
pub mod raster;
pub mod score;
pub mod selector;
pub mod sequence;

// Supporting modules: image buffers, preprocessing, output and tooling.
pub mod config;
pub mod diagnostics;
pub mod edges;
pub mod image;
pub mod preprocess;
pub mod render;

// --- High-level re-exports -------------------------------------------------

pub use crate::cancel::CancelToken;
pub use crate::coverage::{CoverageModel, CoverageTracker};
pub use crate::error::ConfigError;
pub use crate::importance::{ImportanceMap, ImportanceModel, ImportanceOptions};
pub use crate::pins::PinLayout;
pub use crate::selector::{
    Completion, FallbackPolicy, GenerationResult, GeneratorConfig, GreedySelector, StartPin,
};
pub use crate::sequence::{Segment, Sequence};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use string_weaver::prelude::*;
///
/// # fn main() -> Result<(), ConfigError> {
/// let luminance = ImageF32::filled(64, 64, 0.5);
/// let importance = ImportanceMap::build(&luminance, None, &ImportanceOptions::default())?;
/// let pins = PinLayout::inscribed(64, 64, 32)?;
/// let config = GeneratorConfig { pin_count: 32, max_lines: 100, ..Default::default() };
///
/// let result = GreedySelector::new(&importance, &pins, config)?
///     .run(|i, seg| println!("{i}: {} -> {}", seg.from, seg.to), &CancelToken::new());
/// println!("{:?} after {} lines", result.completion, result.sequence.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageF32;
    pub use crate::{
        CancelToken, ConfigError, GeneratorConfig, GreedySelector, ImportanceMap,
        ImportanceOptions, PinLayout,
    };
}
