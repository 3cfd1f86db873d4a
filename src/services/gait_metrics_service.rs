/// Gait Metric Extraction Service
///
/// Computes per-phase durations and walking biomechanics from a video whose
/// frames have been assigned ordered TUG phases:
/// - Step detection on the horizontal ankle separation during walking
/// - Stride time, cadence and step length
/// - Step symmetry between alternating steps
/// - Knee flexion range per side
/// - Lateral upper-body sway
///
/// Thin data never raises: missing walking frames or too few steps degrade
/// to zero or `None`. A walking frame without its hip, knee or ankle
/// landmarks is an upstream contract violation and aborts the video.

use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::config::GaitConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{
    EnforcedSequence, FrameRecord, FrameSequence, GaitMetrics, Landmark, Phase, PhaseDurations,
    PoseLandmark, Side,
};
use crate::services::peak_detection::find_peaks;

/// Gait metric extractor
#[derive(Debug, Clone)]
pub struct GaitMetricsExtractor {
    peak_min_distance: usize,
    epsilon: f64,
}

impl GaitMetricsExtractor {
    pub fn new(config: &GaitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            peak_min_distance: config.peak_min_distance,
            epsilon: config.epsilon,
        })
    }

    /// Extract gait metrics for `frames` segmented by `phases`
    pub fn extract(&self, frames: &FrameSequence, phases: &EnforcedSequence) -> Result<GaitMetrics> {
        if frames.len() != phases.len() {
            return Err(AnalysisError::LengthMismatch {
                expected: frames.len(),
                actual: phases.len(),
            });
        }

        let fps = frames.fps();
        let partition = phases.partition();

        let mut phase_durations = PhaseDurations::default();
        for phase in Phase::ALL {
            phase_durations.set(phase, partition.frame_count(phase) as f64 / fps);
        }

        let walking: Vec<&FrameRecord> = partition
            .walking_positions()
            .map(|i| &frames.frames()[i])
            .collect();

        if walking.is_empty() {
            warn!(
                "Video {} has no walking frames; gait metrics default to zero",
                frames.video_id()
            );
            return Ok(GaitMetrics {
                step_count: 0,
                mean_step_length: 0.0,
                stride_time: 0.0,
                cadence: 0.0,
                step_symmetry: None,
                left_knee_range: 0.0,
                right_knee_range: 0.0,
                upper_body_sway: None,
                phase_durations,
            });
        }

        let signal = ankle_separation(&walking)?;
        let peaks = find_peaks(&signal, self.peak_min_distance);
        let step_count = peaks.len();
        let step_times: Vec<f64> = peaks.iter().map(|&p| p as f64 / fps).collect();
        let step_lengths: Vec<f64> = peaks.iter().map(|&p| signal[p]).collect();

        debug!(
            "Video {}: {} walking frames, {} steps detected",
            frames.video_id(),
            walking.len(),
            step_count
        );

        let step_durations: Vec<f64> = step_times.windows(2).map(|w| w[1] - w[0]).collect();
        let stride_time = if step_durations.len() > 1 {
            step_durations.iter().mean() * 2.0
        } else {
            0.0
        };

        let walking_seconds = walking.len() as f64 / fps;
        let cadence = if walking_seconds < self.epsilon {
            0.0
        } else {
            step_count as f64 / walking_seconds * 60.0
        };

        let mean_step_length = if step_lengths.is_empty() {
            0.0
        } else {
            step_lengths.iter().mean()
        };

        let step_symmetry = self.step_symmetry(&step_lengths);
        if step_symmetry.is_none() {
            debug!(
                "Video {}: {} steps is too few for a symmetry estimate",
                frames.video_id(),
                step_count
            );
        }

        let left_knee_range = self.knee_range(&walking, Side::Left)?;
        let right_knee_range = self.knee_range(&walking, Side::Right)?;

        let upper_body_sway = upper_body_sway(&walking);
        if upper_body_sway.is_none() {
            warn!(
                "Video {}: shoulder landmarks missing during walking; sway undefined",
                frames.video_id()
            );
        }

        Ok(GaitMetrics {
            step_count,
            mean_step_length,
            stride_time,
            cadence,
            step_symmetry,
            left_knee_range,
            right_knee_range,
            upper_body_sway,
            phase_durations,
        })
    }

    /// Relative difference between even- and odd-indexed step lengths
    fn step_symmetry(&self, step_lengths: &[f64]) -> Option<f64> {
        if step_lengths.len() < 4 {
            return None;
        }

        let left: Vec<f64> = step_lengths.iter().step_by(2).copied().collect();
        let right: Vec<f64> = step_lengths.iter().skip(1).step_by(2).copied().collect();
        let overall = step_lengths.iter().mean();

        Some((left.iter().mean() - right.iter().mean()).abs() / overall.max(self.epsilon))
    }

    /// Spread of the hip-knee-ankle angle over the walking frames, degrees
    fn knee_range(&self, walking: &[&FrameRecord], side: Side) -> Result<f64> {
        if walking.is_empty() {
            return Ok(0.0);
        }

        let (hip, knee, ankle) = side.leg();
        let mut min_angle = f64::INFINITY;
        let mut max_angle = f64::NEG_INFINITY;

        for frame in walking {
            let angle = joint_angle(
                required(frame, hip)?,
                required(frame, knee)?,
                required(frame, ankle)?,
                self.epsilon,
            );
            min_angle = min_angle.min(angle);
            max_angle = max_angle.max(angle);
        }
        Ok(max_angle - min_angle)
    }
}

/// Angle at `joint` between the segments to `a` and `c`, in degrees
///
/// Uses the x/y image plane. The magnitude product is offset by `epsilon`
/// so coincident points give 90 degrees instead of NaN.
pub fn joint_angle(a: &Landmark, joint: &Landmark, c: &Landmark, epsilon: f64) -> f64 {
    let ba_x = a.x - joint.x;
    let ba_y = a.y - joint.y;
    let bc_x = c.x - joint.x;
    let bc_y = c.y - joint.y;

    let dot = ba_x * bc_x + ba_y * bc_y;
    let mag_ba = (ba_x * ba_x + ba_y * ba_y).sqrt();
    let mag_bc = (bc_x * bc_x + bc_y * bc_y).sqrt();

    let cos_angle = dot / (mag_ba * mag_bc + epsilon);
    cos_angle.clamp(-1.0, 1.0).acos().to_degrees()
}

fn required(frame: &FrameRecord, landmark: PoseLandmark) -> Result<&Landmark> {
    frame
        .landmarks
        .get(landmark)
        .ok_or(AnalysisError::MissingLandmark {
            frame: frame.frame_index,
            landmark: landmark.id(),
        })
}

/// |x(left ankle) - x(right ankle)| per walking frame
fn ankle_separation(walking: &[&FrameRecord]) -> Result<Vec<f64>> {
    walking
        .iter()
        .map(|frame| {
            let left = required(frame, PoseLandmark::LeftAnkle)?;
            let right = required(frame, PoseLandmark::RightAnkle)?;
            Ok((left.x - right.x).abs())
        })
        .collect()
}

/// Population std of the shoulder midpoint x; `None` if any walking frame
/// lacks a shoulder
fn upper_body_sway(walking: &[&FrameRecord]) -> Option<f64> {
    let centers = walking
        .iter()
        .map(|frame| {
            let left = frame.landmarks.get(PoseLandmark::LeftShoulder)?;
            let right = frame.landmarks.get(PoseLandmark::RightShoulder)?;
            Some((left.x + right.x) / 2.0)
        })
        .collect::<Option<Vec<f64>>>()?;

    if centers.is_empty() {
        return None;
    }
    Some(centers.iter().population_std_dev())
}
