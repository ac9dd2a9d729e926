//! Greedy chord selection.
//!
//! The selector owns the run state (current pin, iteration count, seeded RNG,
//! coverage, output sequence) and advances one committed chord per call to
//! [`GreedySelector::next_segment`]. Drivers decide the pace: pull segments
//! one by one (the selector is an [`Iterator`]) or hand control to
//! [`GreedySelector::run`] with a progress callback and a cancel token.
//!
//! Per iteration every other pin is scored against the current coverage
//! snapshot (possibly in parallel); only after the winner is known is its
//! chord committed to the coverage grid. Iterations are strictly sequential.
use crate::cancel::CancelToken;
use crate::coverage::{CoverageModel, CoverageTracker};
use crate::error::ConfigError;
use crate::image::ImageF32;
use crate::importance::ImportanceMap;
use crate::pins::PinLayout;
use crate::raster::{chord_indices, ChordCache};
use crate::score::{self, chord_score, Candidate, ParallelScoringOptions};
use crate::sequence::{Segment, Sequence};
use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::iter::FusedIterator;

/// Where the first chord starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPin {
    Fixed(usize),
    /// Drawn uniformly from the seeded RNG.
    Random,
}

/// What to do when no candidate meets the acceptance threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// End the run; the shorter sequence is a valid result.
    #[default]
    StopEarly,
    /// Force a uniformly random move so exactly `max_lines` chords are emitted.
    FixedCountFallback,
}

/// Parameters of one generation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Must match the pin layout handed to the selector.
    pub pin_count: usize,
    pub max_lines: usize,
    pub start_pin: StartPin,
    /// Minimum chord score accepted as an improvement (>= 0).
    pub threshold: f64,
    pub coverage_model: CoverageModel,
    pub fallback: FallbackPolicy,
    pub rng_seed: u64,
    /// Keep rasterized chords in memory across iterations.
    pub cache_chords: bool,
    pub parallel: ParallelScoringOptions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pin_count: 300,
            max_lines: 4000,
            start_pin: StartPin::Fixed(0),
            threshold: 0.0,
            coverage_model: CoverageModel::Additive,
            fallback: FallbackPolicy::StopEarly,
            rng_seed: 0,
            cache_chords: false,
            parallel: ParallelScoringOptions::default(),
        }
    }
}

impl GeneratorConfig {
    /// Check the run parameters against a pin layout of `layout_pins` pins.
    pub fn validate(&self, layout_pins: usize) -> Result<(), ConfigError> {
        if self.pin_count < 2 {
            return Err(ConfigError::TooFewPins {
                count: self.pin_count,
            });
        }
        if self.pin_count != layout_pins {
            return Err(ConfigError::PinCountMismatch {
                configured: self.pin_count,
                layout: layout_pins,
            });
        }
        if self.max_lines == 0 {
            return Err(ConfigError::ZeroMaxLines);
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if let StartPin::Fixed(start) = self.start_pin {
            if start >= self.pin_count {
                return Err(ConfigError::StartPinOutOfRange {
                    start,
                    count: self.pin_count,
                });
            }
        }
        self.coverage_model.validate()
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// Reached `max_lines`.
    MaxLines,
    /// Stop-early policy: no candidate met the threshold.
    EarlyTermination,
    /// Cancel token fired, or the driver stopped pulling before the end.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Completed(Completion),
}

/// Mutable per-run state owned by the selector.
#[derive(Clone, Debug)]
pub struct GenerationState {
    pub current_pin: usize,
    pub iterations: usize,
    /// Moves forced by the fallback policy.
    pub forced_moves: usize,
    /// Score of the most recently accepted chord (`None` for forced moves).
    pub last_score: Option<f64>,
    rng: Pcg64,
}

/// Final output of a run.
#[derive(Clone, Debug)]
pub struct GenerationResult {
    pub sequence: Sequence,
    pub coverage: ImageF32,
    pub completion: Completion,
    pub iterations: usize,
    pub forced_moves: usize,
    pub residual_l1: f64,
}

enum ChordSource {
    Direct,
    Cached(ChordCache),
}

pub struct GreedySelector<'a> {
    pins: &'a PinLayout,
    coverage: CoverageTracker<'a>,
    chords: ChordSource,
    config: GeneratorConfig,
    state: GenerationState,
    sequence: Sequence,
    status: RunState,
}

impl<'a> GreedySelector<'a> {
    /// Validate the configuration and prepare a run with zero coverage.
    pub fn new(
        importance: &'a ImportanceMap,
        pins: &'a PinLayout,
        config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate(pins.len())?;
        let coverage = CoverageTracker::new(importance, config.coverage_model)?;
        Ok(Self::from_parts(pins, coverage, config))
    }

    /// Prepare a run that continues from an existing coverage grid.
    pub fn with_initial_coverage(
        importance: &'a ImportanceMap,
        pins: &'a PinLayout,
        coverage: ImageF32,
        config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate(pins.len())?;
        let coverage =
            CoverageTracker::with_coverage(importance, coverage, config.coverage_model)?;
        Ok(Self::from_parts(pins, coverage, config))
    }

    fn from_parts(
        pins: &'a PinLayout,
        coverage: CoverageTracker<'a>,
        config: GeneratorConfig,
    ) -> Self {
        let mut rng = Pcg64::seed_from_u64(config.rng_seed);
        let current_pin = match config.start_pin {
            StartPin::Fixed(pin) => pin,
            StartPin::Random => rng.random_range(0..pins.len()),
        };
        let (w, h) = coverage.importance().shape();
        let chords = if config.cache_chords {
            ChordSource::Cached(ChordCache::new(pins.len(), w, h))
        } else {
            ChordSource::Direct
        };
        Self {
            pins,
            coverage,
            chords,
            sequence: Sequence::with_capacity(config.max_lines.min(1 << 16)),
            state: GenerationState {
                current_pin,
                iterations: 0,
                forced_moves: 0,
                last_score: None,
                rng,
            },
            config,
            status: RunState::Ready,
        }
    }

    pub fn status(&self) -> RunState {
        self.status
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn current_pin(&self) -> usize {
        self.state.current_pin
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn coverage(&self) -> &CoverageTracker<'a> {
        &self.coverage
    }

    pub fn pins(&self) -> &PinLayout {
        self.pins
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Compute and commit the next chord.
    ///
    /// Returns `None` once the run has completed; the completion reason is
    /// then available from [`status`](Self::status).
    pub fn next_segment(&mut self) -> Option<Segment> {
        match self.status {
            RunState::Completed(_) => return None,
            RunState::Ready => {
                let (w, h) = self.coverage.importance().shape();
                debug!(
                    "Selector: starting run grid={}x{} pins={} max_lines={} start_pin={} \
                     fallback={:?}",
                    w,
                    h,
                    self.pins.len(),
                    self.config.max_lines,
                    self.state.current_pin,
                    self.config.fallback
                );
                self.status = RunState::Running;
            }
            RunState::Running => {}
        }
        if self.state.iterations >= self.config.max_lines {
            self.complete(Completion::MaxLines);
            return None;
        }

        let current = self.state.current_pin;
        let next = match self.best_candidate(current) {
            Some(c) if c.score > 0.0 && c.score >= self.config.threshold => {
                trace!(
                    "Selector: iteration {} {} -> {} score={:.3}",
                    self.state.iterations,
                    current,
                    c.pin,
                    c.score
                );
                self.state.last_score = Some(c.score);
                c.pin
            }
            best => match self.config.fallback {
                FallbackPolicy::StopEarly => {
                    debug!(
                        "Selector: no candidate meets threshold {:.3} (best={:?}) after {} lines",
                        self.config.threshold,
                        best.map(|c| c.score),
                        self.state.iterations
                    );
                    self.complete(Completion::EarlyTermination);
                    return None;
                }
                FallbackPolicy::FixedCountFallback => {
                    let pin = self.random_other_pin(current);
                    debug!(
                        "Selector: forced move {} -> {} at iteration {} (best={:?})",
                        current,
                        pin,
                        self.state.iterations,
                        best.map(|c| c.score)
                    );
                    self.state.forced_moves += 1;
                    self.state.last_score = None;
                    pin
                }
            },
        };

        let segment = Segment::new(current, next);
        self.commit(segment);
        if self.state.iterations >= self.config.max_lines {
            self.complete(Completion::MaxLines);
        }
        Some(segment)
    }

    /// Drive the run to completion.
    ///
    /// `progress` is called once per committed chord with the zero-based
    /// iteration index. `cancel` is polled before every iteration; a cancelled
    /// run still returns the chords committed so far.
    pub fn run<P>(mut self, mut progress: P, cancel: &CancelToken) -> GenerationResult
    where
        P: FnMut(usize, &Segment),
    {
        loop {
            if matches!(self.status, RunState::Completed(_)) {
                break;
            }
            if cancel.is_cancelled() {
                debug!("Selector: cancelled after {} lines", self.state.iterations);
                self.complete(Completion::Cancelled);
                break;
            }
            match self.next_segment() {
                Some(segment) => progress(self.state.iterations - 1, &segment),
                None => break,
            }
        }
        self.finish()
    }

    /// Consume the selector and return its output.
    ///
    /// A run that has not completed yet is reported as cancelled.
    pub fn finish(self) -> GenerationResult {
        let completion = match self.status {
            RunState::Completed(reason) => reason,
            RunState::Ready | RunState::Running => Completion::Cancelled,
        };
        let residual_l1 = self.coverage.residual_l1();
        info!(
            "Selector: finished with {} lines ({:?}, forced={}, residual={:.2})",
            self.sequence.len(),
            completion,
            self.state.forced_moves,
            residual_l1
        );
        GenerationResult {
            sequence: self.sequence,
            coverage: self.coverage.into_coverage(),
            completion,
            iterations: self.state.iterations,
            forced_moves: self.state.forced_moves,
            residual_l1,
        }
    }

    fn complete(&mut self, reason: Completion) {
        if !matches!(self.status, RunState::Completed(_)) {
            self.status = RunState::Completed(reason);
        }
    }

    fn best_candidate(&self, current: usize) -> Option<Candidate> {
        let (w, h) = self.coverage.importance().shape();
        let pins = self.pins;
        let coverage = &self.coverage;
        let chords = &self.chords;
        score::best_candidate(current, pins.len(), self.config.parallel, |j| match chords {
            ChordSource::Cached(cache) => chord_score(coverage, cache.get(pins, current, j)),
            ChordSource::Direct => chord_score(coverage, &chord_indices(pins, current, j, w, h)),
        })
    }

    fn random_other_pin(&mut self, current: usize) -> usize {
        let pin = self.state.rng.random_range(0..self.pins.len() - 1);
        if pin >= current {
            pin + 1
        } else {
            pin
        }
    }

    fn commit(&mut self, segment: Segment) {
        let (w, h) = self.coverage.importance().shape();
        let pixels: Cow<'_, [u32]> = match &self.chords {
            ChordSource::Cached(cache) => {
                Cow::Borrowed(cache.get(self.pins, segment.from, segment.to))
            }
            ChordSource::Direct => {
                Cow::Owned(chord_indices(self.pins, segment.from, segment.to, w, h))
            }
        };
        self.coverage.update(&pixels);
        self.sequence.push(segment);
        self.state.current_pin = segment.to;
        self.state.iterations += 1;
    }
}

impl Iterator for GreedySelector<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        self.next_segment()
    }
}

impl FusedIterator for GreedySelector<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(w: usize, h: usize, value: f32) -> ImportanceMap {
        ImportanceMap::from_grid(ImageF32::filled(w, h, value)).unwrap()
    }

    fn config(pin_count: usize, max_lines: usize) -> GeneratorConfig {
        GeneratorConfig {
            pin_count,
            max_lines,
            parallel: ParallelScoringOptions::disabled(),
            ..Default::default()
        }
    }

    #[test]
    fn validation_happens_before_the_run() {
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let err = |cfg: GeneratorConfig| GreedySelector::new(&imp, &pins, cfg).err();

        assert_eq!(err(config(4, 0)), Some(ConfigError::ZeroMaxLines));
        assert_eq!(
            err(config(5, 3)),
            Some(ConfigError::PinCountMismatch {
                configured: 5,
                layout: 4
            })
        );
        assert_eq!(
            err(GeneratorConfig {
                start_pin: StartPin::Fixed(4),
                ..config(4, 3)
            }),
            Some(ConfigError::StartPinOutOfRange { start: 4, count: 4 })
        );
        assert_eq!(
            err(GeneratorConfig {
                threshold: -1.0,
                ..config(4, 3)
            }),
            Some(ConfigError::InvalidThreshold(-1.0))
        );
        assert_eq!(
            err(GeneratorConfig {
                coverage_model: CoverageModel::Multiplicative { gamma: 0.0 },
                ..config(4, 3)
            }),
            Some(ConfigError::InvalidGamma(0.0))
        );
        assert_eq!(
            GreedySelector::with_initial_coverage(&imp, &pins, ImageF32::new(9, 10), config(4, 3))
                .err(),
            Some(ConfigError::ShapeMismatch {
                expected: (10, 10),
                found: (9, 10)
            })
        );
    }

    #[test]
    fn four_pin_square_picks_highest_demand_chords() {
        // Pins at (9,5), (5,9), (1,5), (5,1).
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let result = GreedySelector::new(&imp, &pins, config(4, 3))
            .unwrap()
            .run(|_, _| {}, &CancelToken::new());
        let expected: Vec<Segment> = vec![(0, 2).into(), (2, 1).into(), (1, 3).into()];
        assert_eq!(result.sequence.segments(), expected.as_slice());
        assert_eq!(result.completion, Completion::MaxLines);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.forced_moves, 0);
        for seg in result.sequence.iter() {
            for px in crate::raster::chord_indices(&pins, seg.from, seg.to, 10, 10) {
                assert_eq!(result.coverage.as_slice()[px as usize], 1.0);
            }
        }
    }

    #[test]
    fn coverage_never_exceeds_importance() {
        let mut grid = ImageF32::new(30, 30);
        for y in 0..30 {
            for x in 0..30 {
                grid.set(x, y, (x as f32 / 29.0) * 2.5);
            }
        }
        let imp = ImportanceMap::from_grid(grid).unwrap();
        let pins = PinLayout::inscribed(30, 30, 16).unwrap();
        for model in [
            CoverageModel::Additive,
            CoverageModel::Multiplicative { gamma: 0.9 },
        ] {
            let cfg = GeneratorConfig {
                coverage_model: model,
                ..config(16, 60)
            };
            let mut progress = Vec::new();
            let result = GreedySelector::new(&imp, &pins, cfg)
                .unwrap()
                .run(|i, s| progress.push((i, *s)), &CancelToken::new());
            for (c, i) in result.coverage.as_slice().iter().zip(imp.values()) {
                assert!(*c >= 0.0 && c <= i, "coverage {c} above importance {i}");
            }
            assert_eq!(progress.len(), result.sequence.len());
            for (k, (i, s)) in progress.iter().enumerate() {
                assert_eq!(*i, k);
                assert_eq!(s, &result.sequence.segments()[k]);
            }
            let path = result.sequence.pin_path();
            for w in result.sequence.segments().windows(2) {
                assert_eq!(w[0].to, w[1].from);
            }
            assert_eq!(path.first(), Some(&0));
        }
    }

    #[test]
    fn resuming_from_saturated_coverage_stops_immediately() {
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let full = ImageF32::filled(10, 10, 1.0);
        let mut selector =
            GreedySelector::with_initial_coverage(&imp, &pins, full, config(4, 5)).unwrap();
        assert_eq!(selector.next(), None);
        assert_eq!(
            selector.status(),
            RunState::Completed(Completion::EarlyTermination)
        );
    }

    #[test]
    fn finishing_early_reports_cancelled() {
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let mut selector = GreedySelector::new(&imp, &pins, config(4, 3)).unwrap();
        let first = selector.next_segment();
        assert_eq!(first, Some(Segment::new(0, 2)));
        let result = selector.finish();
        assert_eq!(result.completion, Completion::Cancelled);
        assert_eq!(result.sequence.len(), 1);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: GeneratorConfig = serde_json::from_str(
            r#"{"pin_count": 12, "start_pin": "random", "fallback": "fixed_count_fallback",
                "coverage_model": {"kind": "multiplicative", "gamma": 0.9}}"#,
        )
        .unwrap();
        assert_eq!(cfg.pin_count, 12);
        assert_eq!(cfg.max_lines, 4000);
        assert_eq!(cfg.start_pin, StartPin::Random);
        assert_eq!(cfg.fallback, FallbackPolicy::FixedCountFallback);
        let fixed: GeneratorConfig =
            serde_json::from_str(r#"{"start_pin": {"fixed": 3}}"#).unwrap();
        assert_eq!(fixed.start_pin, StartPin::Fixed(3));
    }

    #[test]
    fn state_machine_moves_from_ready_to_completed() {
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let mut selector = GreedySelector::new(&imp, &pins, config(4, 2)).unwrap();
        assert_eq!(selector.status(), RunState::Ready);
        assert!(selector.next_segment().is_some());
        assert_eq!(selector.status(), RunState::Running);
        assert!(selector.next_segment().is_some());
        assert_eq!(selector.status(), RunState::Completed(Completion::MaxLines));
        assert_eq!(selector.next_segment(), None);
        assert_eq!(selector.sequence().len(), 2);
    }

    #[test]
    fn stop_early_ends_on_blank_image() {
        let imp = uniform(12, 12, 0.0);
        let pins = PinLayout::inscribed(12, 12, 6).unwrap();
        let result = GreedySelector::new(&imp, &pins, config(6, 10))
            .unwrap()
            .run(|_, _| {}, &CancelToken::new());
        assert!(result.sequence.is_empty());
        assert_eq!(result.completion, Completion::EarlyTermination);
    }

    #[test]
    fn fixed_count_fallback_always_emits_max_lines() {
        let imp = uniform(12, 12, 0.0);
        let pins = PinLayout::inscribed(12, 12, 6).unwrap();
        let cfg = GeneratorConfig {
            fallback: FallbackPolicy::FixedCountFallback,
            rng_seed: 7,
            ..config(6, 25)
        };
        let result = GreedySelector::new(&imp, &pins, cfg)
            .unwrap()
            .run(|_, _| {}, &CancelToken::new());
        assert_eq!(result.sequence.len(), 25);
        assert_eq!(result.forced_moves, 25);
        assert_eq!(result.completion, Completion::MaxLines);
        assert!(result.sequence.iter().all(|s| s.from != s.to));
    }

    #[test]
    fn same_seed_gives_same_random_run() {
        let imp = uniform(16, 16, 0.0);
        let pins = PinLayout::inscribed(16, 16, 10).unwrap();
        let cfg = GeneratorConfig {
            start_pin: StartPin::Random,
            fallback: FallbackPolicy::FixedCountFallback,
            rng_seed: 1234,
            ..config(10, 40)
        };
        let a: Vec<Segment> = GreedySelector::new(&imp, &pins, cfg.clone()).unwrap().collect();
        let b: Vec<Segment> = GreedySelector::new(&imp, &pins, cfg).unwrap().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn threshold_rejects_weak_candidates() {
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let cfg = GeneratorConfig {
            threshold: 100.0,
            ..config(4, 3)
        };
        let result = GreedySelector::new(&imp, &pins, cfg)
            .unwrap()
            .run(|_, _| {}, &CancelToken::new());
        assert!(result.sequence.is_empty());
        assert_eq!(result.completion, Completion::EarlyTermination);
    }

    #[test]
    fn cancelled_token_returns_partial_result() {
        let imp = uniform(10, 10, 1.0);
        let pins = PinLayout::inscribed(10, 10, 4).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let result = GreedySelector::new(&imp, &pins, config(4, 3)).unwrap().run(|_, _| {}, &token);
        assert!(result.sequence.is_empty());
        assert_eq!(result.completion, Completion::Cancelled);

        let token = CancelToken::new();
        let stopper = token.clone();
        let result = GreedySelector::new(&imp, &pins, config(4, 3)).unwrap().run(
            |i, _| {
                if i == 0 {
                    stopper.cancel();
                }
            },
            &token,
        );
        assert_eq!(result.sequence.len(), 1);
        assert_eq!(result.completion, Completion::Cancelled);
    }

    #[test]
    fn cached_and_direct_chords_agree() {
        let mut grid = ImageF32::new(40, 40);
        for y in 0..40 {
            for x in 0..40 {
                grid.set(x, y, ((x * 3 + y * 5) % 17) as f32 / 16.0);
            }
        }
        let imp = ImportanceMap::from_grid(grid).unwrap();
        let pins = PinLayout::inscribed(40, 40, 24).unwrap();
        let direct: Vec<Segment> =
            GreedySelector::new(&imp, &pins, config(24, 30)).unwrap().collect();
        let cached: Vec<Segment> = GreedySelector::new(
            &imp,
            &pins,
            GeneratorConfig {
                cache_chords: true,
                ..config(24, 30)
            },
        )
        .unwrap()
        .collect();
        assert_eq!(direct, cached);
    }
}
