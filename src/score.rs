//! Candidate scoring and winner selection.
//!
//! A chord's score is the remaining demand summed over its pixels, each term
//! clamped at zero so saturated pixels never penalise a candidate. The winner
//! is the highest score; ties go to the lowest pin index. The reduction is
//! order-independent, so the parallel path picks the same winner as the
//! sequential scan.
use crate::coverage::Demand;
use serde::{Deserialize, Serialize};

/// Scored candidate chord ending at `pin`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub pin: usize,
    pub score: f64,
}

impl Candidate {
    /// Higher score wins; equal scores prefer the lower pin index.
    #[inline]
    fn better(self, other: Candidate) -> Candidate {
        if other.score > self.score || (other.score == self.score && other.pin < self.pin) {
            other
        } else {
            self
        }
    }
}

/// Sum of clamped remaining demand over the chord's pixels.
#[inline]
pub fn chord_score<D: Demand + ?Sized>(demand: &D, pixels: &[u32]) -> f64 {
    pixels
        .iter()
        .map(|&idx| demand.remaining_demand(idx as usize).max(0.0) as f64)
        .sum()
}

/// Controls whether candidate scoring runs sequentially or with Rayon.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelScoringOptions {
    enabled: bool,
    min_pins_for_parallel: usize,
}

impl ParallelScoringOptions {
    pub fn new(enabled: bool, min_pins_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_pins_for_parallel: min_pins_for_parallel.max(2),
        }
    }

    /// Disable parallel scoring regardless of pin count.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_pins_for_parallel: usize::MAX,
        }
    }

    /// Returns true when parallel scoring should be used for `pin_count`.
    pub fn should_parallelize(&self, pin_count: usize) -> bool {
        self.enabled && pin_count >= self.min_pins_for_parallel
    }
}

impl Default for ParallelScoringOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_pins_for_parallel: 64,
        }
    }
}

/// Score every pin except `current` and return the winner.
///
/// `score` maps a candidate pin to its chord score and must be a pure
/// function of the shared, unmodified coverage snapshot. Returns `None` only
/// when there is no other pin to choose.
pub fn best_candidate<F>(
    current: usize,
    pin_count: usize,
    parallel: ParallelScoringOptions,
    score: F,
) -> Option<Candidate>
where
    F: Fn(usize) -> f64 + Sync,
{
    if parallel.should_parallelize(pin_count) {
        #[cfg(feature = "parallel")]
        {
            return best_candidate_parallel(current, pin_count, score);
        }
    }
    best_candidate_sequential(current, pin_count, score)
}

fn best_candidate_sequential<F>(current: usize, pin_count: usize, score: F) -> Option<Candidate>
where
    F: Fn(usize) -> f64,
{
    let mut best: Option<Candidate> = None;
    for pin in (0..pin_count).filter(|&j| j != current) {
        let candidate = Candidate {
            pin,
            score: score(pin),
        };
        best = Some(match best {
            Some(b) => b.better(candidate),
            None => candidate,
        });
    }
    best
}

#[cfg(feature = "parallel")]
fn best_candidate_parallel<F>(current: usize, pin_count: usize, score: F) -> Option<Candidate>
where
    F: Fn(usize) -> f64 + Sync,
{
    use rayon::prelude::*;

    (0..pin_count)
        .into_par_iter()
        .filter(|&j| j != current)
        .map(|pin| Candidate {
            pin,
            score: score(pin),
        })
        .reduce_with(Candidate::better)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f32>);

    impl Demand for Fixed {
        fn remaining_demand(&self, idx: usize) -> f32 {
            self.0[idx]
        }
    }

    #[test]
    fn chord_score_clamps_negative_terms() {
        let demand = Fixed(vec![1.0, -3.0, 0.5]);
        assert_eq!(chord_score(&demand, &[0, 1, 2]), 1.5);
        assert_eq!(chord_score(&demand, &[]), 0.0);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let scores = [0.0, 5.0, 9.0, 9.0, 2.0];
        let best = best_candidate(0, 5, ParallelScoringOptions::disabled(), |j| scores[j]).unwrap();
        assert_eq!(best, Candidate { pin: 2, score: 9.0 });
    }

    #[test]
    fn current_pin_is_never_a_candidate() {
        let scores = [100.0, 1.0, 1.0];
        let best = best_candidate(0, 3, ParallelScoringOptions::disabled(), |j| scores[j]).unwrap();
        assert_eq!(best.pin, 1);
        assert!(best_candidate(0, 1, ParallelScoringOptions::disabled(), |_| 1.0).is_none());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let scores: Vec<f64> = (0..257).map(|j| ((j * 37) % 11) as f64).collect();
        for current in [0usize, 3, 100, 256] {
            let n = scores.len();
            let seq = best_candidate(current, n, ParallelScoringOptions::disabled(), |j| scores[j]);
            let parallel = ParallelScoringOptions::new(true, 2);
            let par = best_candidate(current, n, parallel, |j| scores[j]);
            assert_eq!(seq, par, "current={current}");
        }
    }
}
