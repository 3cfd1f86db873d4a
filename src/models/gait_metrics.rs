/// Gait and TUG metric records
///
/// Metrics that can be undefined for lack of data (`step_symmetry`,
/// `upper_body_sway`) are `Option<f64>` so that an undefined value is never
/// confused with a computed zero. They serialize as `null`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::phase::Phase;

/// Seconds spent in each of the six phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub sit_to_stand: f64,
    pub walk_from_chair: f64,
    pub turn_first: f64,
    pub walk_to_chair: f64,
    pub turn_second: f64,
    pub stand_to_sit: f64,
}

impl PhaseDurations {
    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::SitToStand => self.sit_to_stand,
            Phase::WalkFromChair => self.walk_from_chair,
            Phase::TurnFirst => self.turn_first,
            Phase::WalkToChair => self.walk_to_chair,
            Phase::TurnSecond => self.turn_second,
            Phase::StandToSit => self.stand_to_sit,
        }
    }

    pub fn set(&mut self, phase: Phase, seconds: f64) {
        match phase {
            Phase::SitToStand => self.sit_to_stand = seconds,
            Phase::WalkFromChair => self.walk_from_chair = seconds,
            Phase::TurnFirst => self.turn_first = seconds,
            Phase::WalkToChair => self.walk_to_chair = seconds,
            Phase::TurnSecond => self.turn_second = seconds,
            Phase::StandToSit => self.stand_to_sit = seconds,
        }
    }

    pub fn walking(&self) -> f64 {
        self.walk_from_chair + self.walk_to_chair
    }

    pub fn turning(&self) -> f64 {
        self.turn_first + self.turn_second
    }

    pub fn total(&self) -> f64 {
        Phase::ALL.iter().map(|p| self.get(*p)).sum()
    }

    /// Durations of the phases that occur, keyed by phase label and rounded
    /// to centiseconds
    pub fn rounded_report(&self) -> BTreeMap<String, f64> {
        Phase::ALL
            .iter()
            .filter(|p| self.get(**p) > 0.0)
            .map(|p| (p.label().to_string(), round_to(self.get(*p), 2)))
            .collect()
    }
}

/// Gait metrics for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitMetrics {
    pub step_count: usize,
    pub mean_step_length: f64,
    /// Seconds
    pub stride_time: f64,
    /// Steps per minute
    pub cadence: f64,
    /// Undefined below four steps
    pub step_symmetry: Option<f64>,
    /// Degrees
    pub left_knee_range: f64,
    /// Degrees
    pub right_knee_range: f64,
    /// Undefined when shoulder landmarks are missing
    pub upper_body_sway: Option<f64>,
    pub phase_durations: PhaseDurations,
}

impl GaitMetrics {
    pub fn turn1_duration(&self) -> f64 {
        self.phase_durations.turn_first
    }

    pub fn turn2_duration(&self) -> f64 {
        self.phase_durations.turn_second
    }
}

/// Timing aggregates used for severity classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TugMetrics {
    pub total_walking_time: f64,
    pub total_turning_time: f64,
    pub total_time: f64,
    pub turn_walk_ratio: f64,
    pub phase_durations: PhaseDurations,
}

impl TugMetrics {
    /// Derive the aggregates from per-phase durations; the ratio denominator
    /// is floored at `epsilon`.
    pub fn from_durations(durations: PhaseDurations, epsilon: f64) -> Self {
        let total_walking_time = durations.walking();
        let total_turning_time = durations.turning();
        Self {
            total_walking_time,
            total_turning_time,
            total_time: durations.total(),
            turn_walk_ratio: total_turning_time / total_walking_time.max(epsilon),
            phase_durations: durations,
        }
    }

    /// Aggregates supplied directly, e.g. from a clinician's stopwatch
    pub fn from_totals(
        total_time: f64,
        turn_walk_ratio: f64,
        total_walking_time: f64,
        total_turning_time: f64,
    ) -> Self {
        Self {
            total_walking_time,
            total_turning_time,
            total_time,
            turn_walk_ratio,
            phase_durations: PhaseDurations::default(),
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn durations() -> PhaseDurations {
        PhaseDurations {
            sit_to_stand: 1.0,
            walk_from_chair: 2.5,
            turn_first: 1.5,
            walk_to_chair: 2.5,
            turn_second: 1.0,
            stand_to_sit: 1.5,
        }
    }

    #[test]
    fn test_phase_duration_aggregates() {
        let d = durations();
        assert_eq!(d.walking(), 5.0);
        assert_eq!(d.turning(), 2.5);
        assert_eq!(d.total(), 10.0);
    }

    #[test]
    fn test_tug_metrics_from_durations() {
        let tug = TugMetrics::from_durations(durations(), 1e-6);
        assert_eq!(tug.total_time, 10.0);
        assert!((tug.turn_walk_ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_turn_walk_ratio_guarded_without_walking() {
        let mut d = PhaseDurations::default();
        d.set(Phase::TurnFirst, 2.0);
        let tug = TugMetrics::from_durations(d, 1e-6);
        assert!(tug.turn_walk_ratio.is_finite());
        assert!(tug.turn_walk_ratio > 1.0);
    }

    #[test]
    fn test_rounded_report_skips_absent_phases() {
        let mut d = PhaseDurations::default();
        d.set(Phase::SitToStand, 1.23456);
        let report = d.rounded_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("Sit-To-Stand"), Some(&1.23));
    }

    #[test]
    fn test_undefined_metrics_serialize_as_null() {
        let metrics = GaitMetrics {
            step_count: 2,
            mean_step_length: 0.1,
            stride_time: 0.0,
            cadence: 40.0,
            step_symmetry: None,
            left_knee_range: 10.0,
            right_knee_range: 12.0,
            upper_body_sway: None,
            phase_durations: PhaseDurations::default(),
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json["step_symmetry"].is_null());
        assert!(json["upper_body_sway"].is_null());
    }
}
