/// Phase Sequence Enforcement Service
///
/// Turns the smoothed per-frame predictions into a segmentation that walks
/// through the six TUG phases in order and never moves backwards.
///
/// For every frame the enforcer emits the current phase, then inspects the
/// next `lookahead` smoothed labels (fewer near the end of the video). When
/// at least `evidence_threshold` of them name the next expected phase, the
/// persistence counter grows; otherwise it resets. Once the counter reaches
/// `min_persistence` the machine advances and the new phase applies from
/// the following frame. The final phase is terminal.

use tracing::debug;

use crate::config::EnforcerConfig;
use crate::error::Result;
use crate::models::{EnforcedSequence, Phase, SmoothedSequence};

/// Persistence-counter state machine over the configured phase order
#[derive(Debug, Clone)]
pub struct PhaseEnforcer {
    phase_order: Vec<Phase>,
    min_persistence: usize,
    lookahead: usize,
    evidence_threshold: usize,
}

impl PhaseEnforcer {
    /// Create an enforcer, rejecting an invalid phase order or thresholds
    pub fn new(config: &EnforcerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            phase_order: config.phase_order.clone(),
            min_persistence: config.min_persistence,
            lookahead: config.lookahead,
            evidence_threshold: config.evidence_threshold,
        })
    }

    pub fn phase_order(&self) -> &[Phase] {
        &self.phase_order
    }

    /// Produce a monotonic phase assignment of the same length as `smoothed`
    pub fn enforce(&self, smoothed: &[Phase]) -> Vec<Phase> {
        let last_index = self.phase_order.len() - 1;
        let mut result = Vec::with_capacity(smoothed.len());
        let mut current = 0usize;
        let mut persistence = 0usize;

        for i in 0..smoothed.len() {
            if current >= last_index {
                result.push(self.phase_order[last_index]);
                continue;
            }

            result.push(self.phase_order[current]);

            let next = self.phase_order[current + 1];
            let end = (i + self.lookahead).min(smoothed.len());
            let evidence = smoothed[i..end].iter().filter(|p| **p == next).count();

            if evidence >= self.evidence_threshold {
                persistence += 1;
            } else {
                persistence = 0;
            }

            if persistence >= self.min_persistence {
                debug!(
                    "Phase transition {} -> {} after frame position {}",
                    self.phase_order[current], next, i
                );
                current += 1;
                persistence = 0;
            }
        }

        result
    }

    /// Enforce ordering on a smoothed sequence
    pub fn enforce_sequence(&self, smoothed: &SmoothedSequence) -> EnforcedSequence {
        EnforcedSequence::from_enforcer(self.enforce(smoothed.phases()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn enforcer() -> PhaseEnforcer {
        PhaseEnforcer::new(&EnforcerConfig::default()).unwrap()
    }

    fn run(phase_runs: &[(Phase, usize)]) -> Vec<Phase> {
        phase_runs
            .iter()
            .flat_map(|(p, n)| std::iter::repeat(*p).take(*n))
            .collect()
    }

    #[test]
    fn test_rejects_wrong_phase_order_length() {
        let config = EnforcerConfig {
            phase_order: vec![Phase::SitToStand, Phase::StandToSit],
            ..EnforcerConfig::default()
        };
        assert_matches!(
            PhaseEnforcer::new(&config),
            Err(AnalysisError::InvalidPhaseOrder(2))
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(enforcer().enforce(&[]).is_empty());
    }

    #[test]
    fn test_constant_first_phase_never_advances() {
        let input = vec![Phase::SitToStand; 40];
        assert_eq!(enforcer().enforce(&input), input);
    }

    #[test]
    fn test_four_frame_burst_is_ignored() {
        let mut input = vec![Phase::SitToStand; 30];
        for p in &mut input[10..14] {
            *p = Phase::WalkFromChair;
        }
        assert_eq!(enforcer().enforce(&input), vec![Phase::SitToStand; 30]);
    }

    #[test]
    fn test_advances_after_persistence() {
        let input = run(&[(Phase::SitToStand, 20), (Phase::WalkFromChair, 11)]);
        let output = enforcer().enforce(&input);

        // Evidence windows starting at 18..=22 hold >= 3 walking frames,
        // the fifth one completes persistence at position 22.
        let expected = run(&[(Phase::SitToStand, 23), (Phase::WalkFromChair, 8)]);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_skipping_a_phase_is_not_possible() {
        // TurnFirst evidence while the machine expects WalkFromChair
        let input = run(&[(Phase::SitToStand, 10), (Phase::TurnFirst, 30)]);
        let output = enforcer().enforce(&input);
        assert!(output.iter().all(|p| *p == Phase::SitToStand));
    }

    #[test]
    fn test_full_performance_reaches_terminal_phase() {
        let input = run(&[
            (Phase::SitToStand, 20),
            (Phase::WalkFromChair, 20),
            (Phase::TurnFirst, 20),
            (Phase::WalkToChair, 20),
            (Phase::TurnSecond, 20),
            (Phase::StandToSit, 20),
        ]);
        let output = enforcer().enforce(&input);

        assert_eq!(output.len(), input.len());
        assert_eq!(output.last(), Some(&Phase::StandToSit));
        for phase in Phase::ALL {
            assert!(output.contains(&phase), "missing {}", phase);
        }
        assert!(output.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_terminal_phase_is_sticky() {
        let mut input = run(&[
            (Phase::SitToStand, 20),
            (Phase::WalkFromChair, 20),
            (Phase::TurnFirst, 20),
            (Phase::WalkToChair, 20),
            (Phase::TurnSecond, 20),
            (Phase::StandToSit, 20),
        ]);
        input.extend(run(&[(Phase::SitToStand, 20)]));
        let output = enforcer().enforce(&input);

        let first_terminal = output
            .iter()
            .position(|p| *p == Phase::StandToSit)
            .unwrap();
        assert!(output[first_terminal..]
            .iter()
            .all(|p| *p == Phase::StandToSit));
    }

    #[test]
    fn test_truncated_tail_window() {
        // Next phase only in the final two frames: the truncated windows
        // can never hold three matches.
        let input = run(&[(Phase::SitToStand, 10), (Phase::WalkFromChair, 2)]);
        let output = enforcer().enforce(&input);
        assert_eq!(output, vec![Phase::SitToStand; 12]);

        // With threshold 1 and persistence 2 the tail can still advance.
        let config = EnforcerConfig {
            evidence_threshold: 1,
            min_persistence: 2,
            ..EnforcerConfig::default()
        };
        let lenient = PhaseEnforcer::new(&config).unwrap();
        let input = run(&[(Phase::SitToStand, 10), (Phase::WalkFromChair, 1)]);
        let output = lenient.enforce(&input);
        // Windows at positions 6..=10 see the last frame; persistence hits 2
        // at position 7.
        assert_eq!(output[7], Phase::SitToStand);
        assert_eq!(output[8], Phase::WalkFromChair);
        assert_eq!(output.len(), 11);
    }

    #[test]
    fn test_custom_phase_order() {
        let config = EnforcerConfig {
            phase_order: vec![
                Phase::SitToStand,
                Phase::TurnFirst,
                Phase::WalkFromChair,
                Phase::WalkToChair,
                Phase::TurnSecond,
                Phase::StandToSit,
            ],
            ..EnforcerConfig::default()
        };
        let enforcer = PhaseEnforcer::new(&config).unwrap();
        let input = run(&[(Phase::SitToStand, 10), (Phase::TurnFirst, 20)]);
        let output = enforcer.enforce(&input);
        assert_eq!(output.last(), Some(&Phase::TurnFirst));
    }
}
