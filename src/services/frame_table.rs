/// Frame table ingestion
///
/// A frame table is a JSON array with one object per video frame:
///
/// ```json
/// [{"frame": 0, "raw_phase_label": "Sit-To-Stand",
///   "x_0": 0.51, "y_0": 0.12, "z_0": -0.3, "visibility_0": 0.99, ...}]
/// ```
///
/// A landmark is present when both its `x_{id}` and `y_{id}` keys hold
/// numbers; `z_{id}` and `visibility_{id}` default to zero. Rows zero-filled
/// for frames without a detected pose are kept as-is. Unrecognized keys,
/// such as a `tug_subtask` column from an earlier run, are ignored.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::VideoConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{EnforcedSequence, FrameRecord, FrameSequence, Landmark, Landmarks, Phase, PoseLandmark};

/// Reads frame tables into validated frame sequences
#[derive(Debug, Clone)]
pub struct FrameTableReader {
    default_fps: f64,
    require_contiguous: bool,
}

impl FrameTableReader {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            default_fps: config.default_fps,
            require_contiguous: config.require_contiguous_frames,
        }
    }

    /// Read a table from disk; the video id defaults to the file stem
    pub fn read_path(
        &self,
        path: &Path,
        video_id: Option<&str>,
        fps: Option<f64>,
    ) -> Result<FrameSequence> {
        let video_id = match video_id {
            Some(id) => id.to_string(),
            None => video_id_from_path(path).ok_or(AnalysisError::EmptyVideoId)?,
        };

        info!("Reading frame table for {} from {}", video_id, path.display());
        let contents = std::fs::read_to_string(path)?;
        self.parse_str(&video_id, &contents, fps)
    }

    /// Parse a table from its JSON text
    pub fn parse_str(&self, video_id: &str, contents: &str, fps: Option<f64>) -> Result<FrameSequence> {
        let rows: Vec<Value> = serde_json::from_str(contents)?;
        self.parse_rows(video_id, &rows, fps)
    }

    /// Convert already-decoded rows
    pub fn parse_rows(&self, video_id: &str, rows: &[Value], fps: Option<f64>) -> Result<FrameSequence> {
        let frames = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(i, row))
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsed {} frames for {}", frames.len(), video_id);

        for (landmark, count) in missing_gait_landmarks(&frames) {
            warn!(
                "{}: {} of {} frames have no {}",
                video_id,
                count,
                frames.len(),
                landmark.name()
            );
        }
        let zero_filled = frames.iter().filter(|frame| is_zero_filled_pose(frame)).count();
        if zero_filled > 0 {
            debug!("{}: {} zero-filled frames", video_id, zero_filled);
        }

        FrameSequence::with_contiguity(
            video_id,
            fps.unwrap_or(self.default_fps),
            frames,
            self.require_contiguous,
        )
    }
}

impl Default for FrameTableReader {
    fn default() -> Self {
        Self::new(&VideoConfig::default())
    }
}

/// Frames lacking each landmark the gait metrics read; landmarks present in
/// every frame are left out
pub fn missing_gait_landmarks(frames: &[FrameRecord]) -> Vec<(PoseLandmark, usize)> {
    PoseLandmark::REQUIRED_FOR_GAIT
        .iter()
        .filter_map(|&landmark| {
            let missing = frames
                .iter()
                .filter(|frame| !frame.landmarks.contains(landmark))
                .count();
            (missing > 0).then_some((landmark, missing))
        })
        .collect()
}

/// A detected pose whose every landmark was zero-filled upstream
fn is_zero_filled_pose(frame: &FrameRecord) -> bool {
    !frame.landmarks.is_empty() && frame.landmarks.iter().all(|(_, lm)| lm.is_zero_filled())
}

/// File stem of `path`, if it has a usable one
pub fn video_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

fn parse_row(row_number: usize, row: &Value) -> Result<FrameRecord> {
    let object = row.as_object().ok_or_else(|| AnalysisError::MalformedRow {
        row: row_number,
        reason: "expected a JSON object".to_string(),
    })?;

    let frame_index = object
        .get("frame")
        .and_then(Value::as_u64)
        .ok_or_else(|| AnalysisError::MalformedRow {
            row: row_number,
            reason: "missing or non-integer 'frame'".to_string(),
        })?;

    let label = object
        .get("raw_phase_label")
        .and_then(Value::as_str)
        .ok_or_else(|| AnalysisError::MalformedRow {
            row: row_number,
            reason: "missing 'raw_phase_label'".to_string(),
        })?;
    let raw_phase_label: Phase = label.parse().map_err(|_| AnalysisError::UnknownPhaseLabel {
        frame: frame_index,
        label: label.to_string(),
    })?;

    let mut landmarks = Landmarks::new();
    for id in 0..PoseLandmark::COUNT {
        let coordinate = |axis: &str| object.get(&format!("{}_{}", axis, id)).and_then(Value::as_f64);
        if let (Some(x), Some(y)) = (coordinate("x"), coordinate("y")) {
            let z = coordinate("z").unwrap_or(0.0);
            let visibility = coordinate("visibility").unwrap_or(0.0);
            landmarks.insert(id, Landmark::new(x, y, z, visibility));
        }
    }

    Ok(FrameRecord::new(frame_index, landmarks, raw_phase_label))
}

/// Input rows with the enforced phase appended as `tug_subtask`
pub fn labeled_rows(frames: &FrameSequence, phases: &EnforcedSequence) -> Result<Vec<Value>> {
    if frames.len() != phases.len() {
        return Err(AnalysisError::LengthMismatch {
            expected: frames.len(),
            actual: phases.len(),
        });
    }

    Ok(frames
        .frames()
        .iter()
        .zip(phases.phases())
        .map(|(frame, phase)| {
            let mut row = Map::new();
            row.insert("frame".to_string(), Value::from(frame.frame_index));
            for (id, landmark) in frame.landmarks.iter() {
                row.insert(format!("x_{}", id), Value::from(landmark.x));
                row.insert(format!("y_{}", id), Value::from(landmark.y));
                row.insert(format!("z_{}", id), Value::from(landmark.z));
                row.insert(format!("visibility_{}", id), Value::from(landmark.visibility));
            }
            row.insert(
                "raw_phase_label".to_string(),
                Value::from(frame.raw_phase_label.label()),
            );
            row.insert("tug_subtask".to_string(), Value::from(phase.label()));
            Value::Object(row)
        })
        .collect())
}
