use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::phase::Phase;
use crate::models::severity::SeverityLevel;

/// Mean, sample standard deviation and extremes of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    /// Sample standard deviation; undefined for a single value
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Count and share of one severity level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityDetail {
    pub count: usize,
    pub total_time_stats: MetricStats,
    pub turn_walk_ratio_stats: MetricStats,
    pub mean_walking_time: f64,
    pub mean_turning_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Moderate or Severe results
    pub high_risk_count: usize,
    pub high_risk_percentage: f64,
    /// Tests slower than the fall-risk cutoff
    pub fall_risk_count: usize,
    pub fall_risk_percentage: f64,
}

/// Duration statistics of one phase across videos
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseStatistics {
    pub average_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub videos_with_phase: usize,
}

/// Aggregate report over the cross-video summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_tests: usize,
    pub average_total_time: f64,
    pub average_turn_walk_ratio: f64,
    pub severity_distribution: BTreeMap<SeverityLevel, SeverityCount>,
    pub severity_details: BTreeMap<SeverityLevel, SeverityDetail>,
    pub risk_assessment: RiskAssessment,
    pub phase_statistics: BTreeMap<Phase, PhaseStatistics>,
}
