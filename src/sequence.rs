use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One committed chord between two distinct pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
}

impl Segment {
    pub fn new(from: usize, to: usize) -> Self {
        debug_assert!(from != to, "segment endpoints must differ");
        Self { from, to }
    }
}

impl Segment {
    /// Both endpoints are valid, distinct pins of a `pin_count`-pin layout.
    #[inline]
    pub fn fits(&self, pin_count: usize) -> bool {
        self.from != self.to && self.from < pin_count && self.to < pin_count
    }
}

impl From<(usize, usize)> for Segment {
    fn from((from, to): (usize, usize)) -> Self {
        Self::new(from, to)
    }
}

/// Ordered, append-only list of segments in generation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    segments: Vec<Segment>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Check that every segment joins two distinct pins of a `pin_count`-pin
    /// layout. Sequences read from disk are not checked on deserialisation.
    pub fn validate(&self, pin_count: usize) -> Result<(), ConfigError> {
        match self.segments.iter().position(|s| !s.fits(pin_count)) {
            Some(step) => {
                let s = self.segments[step];
                Err(ConfigError::InvalidSegment {
                    step,
                    from: s.from,
                    to: s.to,
                    pin_count,
                })
            }
            None => Ok(()),
        }
    }

    /// Pins in the order the thread visits them: the first `from`, then
    /// every `to`. Empty for an empty sequence.
    pub fn pin_path(&self) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.segments.len() + 1);
        if let Some(first) = self.segments.first() {
            path.push(first.from);
        }
        path.extend(self.segments.iter().map(|s| s.to));
        path
    }

    /// Human-readable winding instructions, one step per line.
    pub fn to_instructions(&self) -> String {
        let mut out = String::new();
        for (step, seg) in self.segments.iter().enumerate() {
            let _ = writeln!(out, "{}: {} -> {}", step + 1, seg.from, seg.to);
        }
        out
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sequence {
        let mut seq = Sequence::new();
        seq.push((0, 2).into());
        seq.push((2, 1).into());
        seq.push((1, 3).into());
        seq
    }

    #[test]
    fn pin_path_follows_the_thread() {
        assert_eq!(sample().pin_path(), vec![0, 2, 1, 3]);
        assert!(Sequence::new().pin_path().is_empty());
    }

    #[test]
    fn instructions_are_numbered_from_one() {
        assert_eq!(sample().to_instructions(), "1: 0 -> 2\n2: 2 -> 1\n3: 1 -> 3\n");
    }

    #[test]
    fn validate_rejects_foreign_segments() {
        assert_eq!(sample().validate(4), Ok(()));
        assert_eq!(
            sample().validate(3),
            Err(ConfigError::InvalidSegment {
                step: 2,
                from: 1,
                to: 3,
                pin_count: 3
            })
        );
        let looped: Sequence = serde_json::from_str(r#"[{"from":1,"to":1}]"#).unwrap();
        assert!(matches!(
            looped.validate(4),
            Err(ConfigError::InvalidSegment { step: 0, .. })
        ));
    }

    #[test]
    fn serializes_as_plain_array() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"from":0,"to":2},{"from":2,"to":1},{"from":1,"to":3}]"#
        );
    }
}
