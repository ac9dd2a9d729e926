use crate::diagnostics::TimingBreakdown;
use crate::importance::ImportanceMap;
use crate::pins::PinLayout;
use crate::selector::{Completion, GenerationResult};
use crate::sequence::Sequence;
use serde::Serialize;

/// JSON-friendly summary of a finished run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub width: usize,
    pub height: usize,
    pub pins: Vec<[f32; 2]>,
    pub sequence: Sequence,
    pub pin_path: Vec<usize>,
    pub completion: Completion,
    pub iterations: usize,
    pub forced_moves: usize,
    /// Sum of `importance - coverage` left after the run.
    pub residual_l1: f64,
    pub total_importance: f64,
    pub timings: TimingBreakdown,
}

impl GenerationReport {
    pub fn new(
        importance: &ImportanceMap,
        pins: &PinLayout,
        result: &GenerationResult,
        timings: TimingBreakdown,
    ) -> Self {
        let (width, height) = importance.shape();
        Self {
            width,
            height,
            pins: pins.points().to_vec(),
            sequence: result.sequence.clone(),
            pin_path: result.sequence.pin_path(),
            completion: result.completion,
            iterations: result.iterations,
            forced_moves: result.forced_moves,
            residual_l1: result.residual_l1,
            total_importance: importance.total(),
            timings,
        }
    }

    /// Fraction of the total importance covered by the run, in [0, 1].
    pub fn covered_fraction(&self) -> f64 {
        if self.total_importance > 0.0 {
            (1.0 - self.residual_l1 / self.total_importance).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "lines={} completion={:?} forced={} covered={:.1}% total_ms={:.1}",
            self.sequence.len(),
            self.completion,
            self.forced_moves,
            self.covered_fraction() * 100.0,
            self.timings.total_ms
        )
    }
}
