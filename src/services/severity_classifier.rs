/// Severity classification from TUG timings
///
/// Rules are checked top to bottom and the first match wins:
///
/// | total time        | turn/walk ratio                          | level    |
/// |-------------------|------------------------------------------|----------|
/// | <= normal max     | < ratio threshold                        | Normal   |
/// | <= slight max     | < ratio threshold                        | Slight   |
/// | <= slight max     | >= ratio threshold                       | Mild     |
/// | > slight max      | > threshold, walking and turning impaired | Severe   |
/// | > slight max      | > threshold                              | Moderate |
/// | <= moderate max   | <= threshold                             | Moderate |
/// | > moderate max    | <= threshold                             | Severe   |
///
/// Non-finite inputs fail every comparison and land in the conservative
/// branches.

use crate::config::SeverityThresholds;
use crate::error::Result;
use crate::models::{SeverityLevel, SeverityResult, TugMetrics};

#[derive(Debug, Clone, Default)]
pub struct SeverityClassifier {
    thresholds: SeverityThresholds,
}

impl SeverityClassifier {
    pub fn new(thresholds: SeverityThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    /// Classify a test; deterministic, including the rationale text
    pub fn classify(&self, metrics: &TugMetrics) -> SeverityResult {
        let t = &self.thresholds;
        let total = metrics.total_time;
        let ratio = metrics.turn_walk_ratio;
        let walking = metrics.total_walking_time;
        let turning = metrics.total_turning_time;

        if total <= t.normal_max_time && ratio < t.ratio_threshold {
            return SeverityResult::new(
                SeverityLevel::Normal,
                format!(
                    "Completed in {:.1}s (≤{}s) with turning ratio {:.2} (<{:.1}), indicating normal mobility",
                    total, t.normal_max_time, ratio, t.ratio_threshold
                ),
            );
        }

        if total <= t.slight_max_time {
            if ratio < t.ratio_threshold {
                return SeverityResult::new(
                    SeverityLevel::Slight,
                    format!(
                        "Completed in {:.1}s (≤{}s) with turning ratio {:.2} (<{:.1}), indicating slight mobility issues",
                        total, t.slight_max_time, ratio, t.ratio_threshold
                    ),
                );
            }
            return SeverityResult::new(
                SeverityLevel::Mild,
                format!(
                    "Completed in {:.1}s (≤{}s) with turning ratio {:.2} (≥{:.1}), indicating mild mobility issues with prolonged turning",
                    total, t.slight_max_time, ratio, t.ratio_threshold
                ),
            );
        }

        if ratio > t.ratio_threshold {
            if walking > t.impairment_time && turning > t.impairment_time {
                return SeverityResult::new(
                    SeverityLevel::Severe,
                    format!(
                        "Completed in {:.1}s (>{}s) with turning ratio {:.2} (>{:.1}) and issues in both walking ({:.1}s >{:.1}s) and turning ({:.1}s >{:.1}s)",
                        total,
                        t.slight_max_time,
                        ratio,
                        t.ratio_threshold,
                        walking,
                        t.impairment_time,
                        turning,
                        t.impairment_time
                    ),
                );
            }
            return SeverityResult::new(
                SeverityLevel::Moderate,
                format!(
                    "Completed in {:.1}s (>{}s) with turning ratio {:.2} (>{:.1}), indicating moderate issues primarily with turning",
                    total, t.slight_max_time, ratio, t.ratio_threshold
                ),
            );
        }

        if total <= t.moderate_max_time {
            return SeverityResult::new(
                SeverityLevel::Moderate,
                format!(
                    "Completed in {:.1}s (>{}s, ≤{}s) with turning ratio {:.2} (≤{:.1}), indicating moderate mobility issues",
                    total, t.slight_max_time, t.moderate_max_time, ratio, t.ratio_threshold
                ),
            );
        }

        SeverityResult::new(
            SeverityLevel::Severe,
            format!(
                "Completed in {:.1}s (>{}s) with turning ratio {:.2} (≤{:.1}), indicating severe mobility issues",
                total, t.moderate_max_time, ratio, t.ratio_threshold
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(total: f64, ratio: f64, walking: f64, turning: f64) -> SeverityResult {
        SeverityClassifier::default().classify(&TugMetrics::from_totals(total, ratio, walking, turning))
    }

    #[test]
    fn test_normal() {
        let result = classify(5.0, 0.2, 3.0, 0.6);
        assert_eq!(result.level, SeverityLevel::Normal);
        assert_eq!(result.score, 0);
        assert_eq!(
            result.rationale,
            "Completed in 5.0s (≤7s) with turning ratio 0.20 (<1.0), indicating normal mobility"
        );
    }

    #[test]
    fn test_slight() {
        let result = classify(12.0, 0.8, 5.0, 4.0);
        assert_eq!(result.level, SeverityLevel::Slight);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn test_mild() {
        let result = classify(12.0, 1.5, 3.0, 4.5);
        assert_eq!(result.level, SeverityLevel::Mild);
        assert_eq!(result.score, 2);
        assert!(result.rationale.contains("(≥1.0)"));
    }

    #[test]
    fn test_severe_when_walking_and_turning_impaired() {
        let result = classify(18.0, 1.3, 5.0, 6.0);
        assert_eq!(result.level, SeverityLevel::Severe);
        assert_eq!(result.score, 4);
        assert_eq!(
            result.rationale,
            "Completed in 18.0s (>13s) with turning ratio 1.30 (>1.0) and issues in both walking (5.0s >4.0s) and turning (6.0s >4.0s)"
        );
    }

    #[test]
    fn test_moderate_primarily_turning() {
        let result = classify(18.0, 1.3, 3.0, 3.9);
        assert_eq!(result.level, SeverityLevel::Moderate);
        assert_eq!(result.score, 3);
        assert!(result.rationale.contains("primarily with turning"));
    }

    #[test]
    fn test_slow_but_balanced() {
        let moderate = classify(15.0, 0.8, 8.0, 6.4);
        assert_eq!(moderate.level, SeverityLevel::Moderate);
        assert_eq!(
            moderate.rationale,
            "Completed in 15.0s (>13s, ≤20s) with turning ratio 0.80 (≤1.0), indicating moderate mobility issues"
        );

        let severe = classify(25.0, 0.8, 12.0, 9.6);
        assert_eq!(severe.level, SeverityLevel::Severe);
        assert!(severe.rationale.contains("(>20s)"));
    }

    #[test]
    fn test_boundaries() {
        // Exactly on the normal limit still counts as normal
        assert_eq!(classify(7.0, 0.5, 4.0, 2.0).level, SeverityLevel::Normal);
        // Ratio exactly at the threshold is not below it
        assert_eq!(classify(7.0, 1.0, 3.0, 3.0).level, SeverityLevel::Mild);
        assert_eq!(classify(13.0, 0.99, 6.0, 5.9).level, SeverityLevel::Slight);
        // Above 13s a ratio of exactly 1.0 uses the balanced branch
        assert_eq!(classify(14.0, 1.0, 5.0, 5.0).level, SeverityLevel::Moderate);
        assert_eq!(classify(20.0, 0.5, 10.0, 5.0).level, SeverityLevel::Moderate);
        assert_eq!(classify(20.01, 0.5, 10.0, 5.0).level, SeverityLevel::Severe);
    }

    #[test]
    fn test_non_finite_input_is_conservative() {
        assert_eq!(classify(f64::NAN, 0.5, 1.0, 1.0).level, SeverityLevel::Severe);
    }

    #[test]
    fn test_deterministic() {
        let a = classify(16.2, 1.12, 6.0, 6.7);
        let b = classify(16.2, 1.12, 6.0, 6.7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = SeverityThresholds {
            normal_max_time: 10.0,
            ..SeverityThresholds::default()
        };
        let classifier = SeverityClassifier::new(thresholds).unwrap();
        let result = classifier.classify(&TugMetrics::from_totals(9.0, 0.5, 5.0, 2.5));
        assert_eq!(result.level, SeverityLevel::Normal);
        assert!(result.rationale.contains("(≤10s)"));
    }
}
