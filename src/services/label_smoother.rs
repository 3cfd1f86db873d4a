/// Label Smoothing Service
///
/// Removes single-frame classifier noise with a centered majority vote.
/// The sequence is padded by repeating its first and last labels
/// `window / 2` times, so every output frame sees a full window.
///
/// Ties are broken in favour of the label with the smallest sort key. Phases
/// sort by their classifier label, so `"Sit-To-Stand"` beats
/// `"Walk-From-Chair"` and `"Stand-To-Sit"` beats `"Turn-First"`.

use crate::error::{AnalysisError, Result};
use crate::models::{Phase, SmoothedSequence};

/// A label the smoother can vote on
pub trait Label: Clone + PartialEq {
    type Key: Ord;

    /// Ordering used to break ties between equally frequent labels
    fn sort_key(&self) -> Self::Key;
}

impl Label for Phase {
    type Key = &'static str;

    fn sort_key(&self) -> Self::Key {
        self.label()
    }
}

impl<'a> Label for &'a str {
    type Key = &'a str;

    fn sort_key(&self) -> Self::Key {
        *self
    }
}

macro_rules! label_by_value {
    ($($t:ty),*) => {
        $(
            impl Label for $t {
                type Key = $t;

                fn sort_key(&self) -> Self::Key {
                    self.clone()
                }
            }
        )*
    };
}

label_by_value!(bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, String);

/// Centered majority-vote smoother
#[derive(Debug, Clone, Copy)]
pub struct LabelSmoother {
    window: usize,
}

impl LabelSmoother {
    /// Create a smoother; `window` must be odd and at least 1
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 || window % 2 == 0 {
            return Err(AnalysisError::InvalidWindow(window));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Smooth an arbitrary label stream; output has the input's length
    pub fn smooth<T: Label>(&self, labels: &[T]) -> Vec<T> {
        let (first, last) = match (labels.first(), labels.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec::new(),
        };

        let pad = self.window / 2;
        let padded: Vec<&T> = std::iter::repeat(first)
            .take(pad)
            .chain(labels.iter())
            .chain(std::iter::repeat(last).take(pad))
            .collect();

        padded
            .windows(self.window)
            .map(|window| majority(window).clone())
            .collect()
    }

    /// Smooth raw phase predictions
    pub fn smooth_sequence(&self, raw: &[Phase]) -> SmoothedSequence {
        SmoothedSequence::new(self.smooth(raw))
    }
}

/// Convenience wrapper validating `window` on every call
pub fn smooth<T: Label>(labels: &[T], window: usize) -> Result<Vec<T>> {
    Ok(LabelSmoother::new(window)?.smooth(labels))
}

/// Most frequent label, smallest sort key winning ties
fn majority<'a, T: Label>(window: &[&'a T]) -> &'a T {
    let mut counts: Vec<(&'a T, usize)> = Vec::with_capacity(window.len());
    for &label in window {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best = counts[0];
    for &(label, count) in &counts[1..] {
        let tied_and_smaller = count == best.1 && label.sort_key() < best.0.sort_key();
        if count > best.1 || tied_and_smaller {
            best = (label, count);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_invalid_window() {
        assert!(LabelSmoother::new(0).is_err());
        assert!(LabelSmoother::new(4).is_err());
        assert!(LabelSmoother::new(1).is_ok());
        assert!(LabelSmoother::new(7).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let smoother = LabelSmoother::new(7).unwrap();
        let out: Vec<u8> = smoother.smooth(&[]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_window_one_is_identity() {
        let labels = vec!['a', 'b', 'a', 'c'];
        assert_eq!(smooth(&labels, 1).unwrap(), labels);
    }

    #[test]
    fn test_removes_single_frame_noise() {
        let labels = vec![1, 1, 1, 2, 1, 1, 1];
        assert_eq!(smooth(&labels, 3).unwrap(), vec![1; 7]);
    }

    #[test]
    fn test_preserves_step_change() {
        let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
        assert_eq!(smooth(&labels, 3).unwrap(), labels);
    }

    #[test]
    fn test_tie_prefers_smallest_label() {
        // index 0 sees [b, b, a] -> b; index 1 sees [b, a, c], all tied -> a;
        // index 2 sees [a, c, c] -> c
        let labels = vec!["b", "a", "c"];
        assert_eq!(smooth(&labels, 3).unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_phase_tie_uses_label_order() {
        let labels = vec![Phase::WalkFromChair, Phase::SitToStand, Phase::TurnFirst];
        assert_eq!(smooth(&labels, 3).unwrap()[1], Phase::SitToStand);

        // "Stand-To-Sit" sorts before "Turn-First" and "Walk-From-Chair"
        // even though it is performed last
        let labels = vec![Phase::WalkFromChair, Phase::StandToSit, Phase::TurnFirst];
        assert_eq!(smooth(&labels, 3).unwrap()[1], Phase::StandToSit);
    }

    #[test]
    fn test_smooth_sequence_wraps_phases() {
        let smoother = LabelSmoother::new(3).unwrap();
        let raw = vec![Phase::TurnSecond, Phase::StandToSit, Phase::TurnSecond];
        let smoothed = smoother.smooth_sequence(&raw);
        assert_eq!(smoothed.phases(), &[Phase::TurnSecond; 3]);
    }

    #[test]
    fn test_shorter_than_window_uses_padding() {
        // Padded: [x, x, x, x, y, y, y, y] for window 7 (pad 3)
        let labels = vec!["x", "y"];
        let out = smooth(&labels, 7).unwrap();
        assert_eq!(out, vec!["x", "y"]);
    }

    #[test]
    fn test_uniform_input_unchanged() {
        let labels = vec![Phase::TurnFirst; 12];
        assert_eq!(smooth(&labels, 7).unwrap(), labels);
    }

    #[test]
    fn test_matches_naive_definition() {
        let labels = vec![3, 1, 1, 2, 3, 3, 2, 2, 1, 3, 3, 3, 1, 2];
        let window = 5;
        let pad = window / 2;
        let mut padded = vec![labels[0]; pad];
        padded.extend(&labels);
        padded.extend(vec![*labels.last().unwrap(); pad]);

        let expected: Vec<i32> = (0..labels.len())
            .map(|i| {
                let slice = &padded[i..i + window];
                let count = |v: &i32| slice.iter().filter(|x| *x == v).count();
                let top = slice.iter().map(|v| count(v)).max().unwrap();
                slice.iter().copied().filter(|v| count(v) == top).min().unwrap()
            })
            .collect();

        assert_eq!(smooth(&labels, window).unwrap(), expected);
    }
}
