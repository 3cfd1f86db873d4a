use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::frame::EnforcedSequence;
use crate::models::gait_metrics::{GaitMetrics, TugMetrics};
use crate::models::phase::Phase;
use crate::models::severity::{SeverityLevel, SeverityResult};

/// Frames and share of the sequence assigned to one phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseShare {
    pub frames: usize,
    pub percentage: f64,
}

/// Bookkeeping about a single pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInfo {
    pub total_frames: usize,
    pub fps: f64,
    pub processing_time_ms: u64,
    pub analyzed_at: DateTime<Utc>,
    /// Distribution of the raw classifier predictions
    pub raw_distribution: BTreeMap<Phase, PhaseShare>,
}

/// Everything the pipeline produces for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video_id: String,
    pub phases: EnforcedSequence,
    pub gait: GaitMetrics,
    pub tug: TugMetrics,
    pub severity: SeverityResult,
    pub processing: ProcessingInfo,
}

impl VideoAnalysis {
    /// Flat summary row for the cross-video table
    pub fn summary_row(&self) -> SummaryRow {
        let d = &self.tug.phase_durations;
        SummaryRow {
            video_id: self.video_id.clone(),
            analyzed_at: self.processing.analyzed_at,
            frame_count: self.processing.total_frames,
            fps: self.processing.fps,
            step_count: self.gait.step_count,
            mean_step_length: self.gait.mean_step_length,
            stride_time: self.gait.stride_time,
            cadence: self.gait.cadence,
            step_symmetry: self.gait.step_symmetry,
            left_knee_range: self.gait.left_knee_range,
            right_knee_range: self.gait.right_knee_range,
            upper_body_sway: self.gait.upper_body_sway,
            turn1_duration: self.gait.turn1_duration(),
            turn2_duration: self.gait.turn2_duration(),
            sit_to_stand_time: d.sit_to_stand,
            walk_from_chair_time: d.walk_from_chair,
            turn_first_time: d.turn_first,
            walk_to_chair_time: d.walk_to_chair,
            turn_second_time: d.turn_second,
            stand_to_sit_time: d.stand_to_sit,
            total_walking_time: self.tug.total_walking_time,
            total_turning_time: self.tug.total_turning_time,
            total_time: self.tug.total_time,
            turn_walk_ratio: self.tug.turn_walk_ratio,
            severity_level: self.severity.level,
            severity_score: self.severity.score,
            severity_rationale: self.severity.rationale.clone(),
        }
    }

    /// Gait, TUG and severity values as a flat key -> value record
    pub fn metrics_record(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self.summary_row()) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// One row of the cross-video summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub video_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub frame_count: usize,
    pub fps: f64,
    pub step_count: usize,
    pub mean_step_length: f64,
    pub stride_time: f64,
    pub cadence: f64,
    pub step_symmetry: Option<f64>,
    pub left_knee_range: f64,
    pub right_knee_range: f64,
    pub upper_body_sway: Option<f64>,
    pub turn1_duration: f64,
    pub turn2_duration: f64,
    pub sit_to_stand_time: f64,
    pub walk_from_chair_time: f64,
    pub turn_first_time: f64,
    pub walk_to_chair_time: f64,
    pub turn_second_time: f64,
    pub stand_to_sit_time: f64,
    pub total_walking_time: f64,
    pub total_turning_time: f64,
    pub total_time: f64,
    pub turn_walk_ratio: f64,
    pub severity_level: SeverityLevel,
    pub severity_score: u8,
    pub severity_rationale: String,
}

impl SummaryRow {
    /// Seconds spent in `phase`
    pub fn phase_time(&self, phase: Phase) -> f64 {
        match phase {
            Phase::SitToStand => self.sit_to_stand_time,
            Phase::WalkFromChair => self.walk_from_chair_time,
            Phase::TurnFirst => self.turn_first_time,
            Phase::WalkToChair => self.walk_to_chair_time,
            Phase::TurnSecond => self.turn_second_time,
            Phase::StandToSit => self.stand_to_sit_time,
        }
    }
}
