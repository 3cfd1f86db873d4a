// Shared fixtures: synthetic TUG recordings

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::path::Path;
use tug_analysis::models::{FrameRecord, FrameSequence, Landmark, Landmarks, Phase, PoseLandmark};

/// Frames per phase in the standard recording (12 seconds at 30 fps)
pub const PHASE_FRAMES: [(Phase, usize); 6] = [
    (Phase::SitToStand, 45),
    (Phase::WalkFromChair, 90),
    (Phase::TurnFirst, 45),
    (Phase::WalkToChair, 90),
    (Phase::TurnSecond, 45),
    (Phase::StandToSit, 45),
];

/// Horizontal ankle separation while standing
pub const STANCE_GAP: f64 = 0.06;

/// Full-body pose with the ankles `gap` apart and the trunk shifted by `sway`
pub fn pose(gap: f64, sway: f64) -> Landmarks {
    Landmarks::new()
        .with(PoseLandmark::Nose, Landmark::new(0.5 + sway, 0.1, -0.2, 0.99))
        .with(PoseLandmark::LeftShoulder, Landmark::new(0.45 + sway, 0.3, 0.0, 0.98))
        .with(PoseLandmark::RightShoulder, Landmark::new(0.55 + sway, 0.3, 0.0, 0.98))
        .with(PoseLandmark::LeftHip, Landmark::new(0.47, 0.5, 0.0, 0.97))
        .with(PoseLandmark::RightHip, Landmark::new(0.53, 0.5, 0.0, 0.97))
        .with(PoseLandmark::LeftKnee, Landmark::new(0.47 - gap / 4.0, 0.7, 0.0, 0.95))
        .with(PoseLandmark::RightKnee, Landmark::new(0.53 + gap / 4.0, 0.7, 0.0, 0.95))
        .with(PoseLandmark::LeftAnkle, Landmark::new(0.5 - gap / 2.0, 0.9, 0.0, 0.9))
        .with(PoseLandmark::RightAnkle, Landmark::new(0.5 + gap / 2.0, 0.9, 0.0, 0.9))
}

/// Ankle separation `offset` frames into a walking segment: one step every
/// 15 frames, peaking 7 frames into each cycle
pub fn walking_gap(offset: usize) -> f64 {
    0.2 - 0.02 * ((offset % 15) as f64 - 7.0).abs()
}

/// A recording of `phases` where the classifier flips one frame in the
/// middle of every segment
pub fn recording(video_id: &str, fps: f64, phases: &[(Phase, usize)]) -> FrameSequence {
    let mut frames = Vec::new();
    let mut index = 0u64;

    for (phase, count) in phases {
        for offset in 0..*count {
            let gap = if phase.is_walking() {
                walking_gap(offset)
            } else {
                STANCE_GAP
            };
            let sway = if index % 2 == 0 { 0.005 } else { -0.005 };
            let label = if offset == count / 2 { noise_label(*phase) } else { *phase };
            frames.push(FrameRecord::new(index, pose(gap, sway), label));
            index += 1;
        }
    }

    FrameSequence::new(video_id, fps, frames).expect("synthetic recording is valid")
}

pub fn standard_recording(video_id: &str) -> FrameSequence {
    recording(video_id, 30.0, &PHASE_FRAMES)
}

/// Same layout with every phase stretched by `factor`
pub fn slow_recording(video_id: &str, factor: usize) -> FrameSequence {
    let phases: Vec<(Phase, usize)> = PHASE_FRAMES.iter().map(|(p, n)| (*p, n * factor)).collect();
    recording(video_id, 30.0, &phases)
}

fn noise_label(phase: Phase) -> Phase {
    if phase == Phase::StandToSit {
        Phase::SitToStand
    } else {
        Phase::StandToSit
    }
}

/// Frame table rows in the on-disk format
pub fn table_rows(frames: &FrameSequence) -> Value {
    let rows: Vec<Value> = frames
        .frames()
        .iter()
        .map(|frame| {
            let mut row = Map::new();
            row.insert("frame".into(), json!(frame.frame_index));
            for (id, landmark) in frame.landmarks.iter() {
                row.insert(format!("x_{}", id), json!(landmark.x));
                row.insert(format!("y_{}", id), json!(landmark.y));
                row.insert(format!("z_{}", id), json!(landmark.z));
                row.insert(format!("visibility_{}", id), json!(landmark.visibility));
            }
            row.insert("raw_phase_label".into(), json!(frame.raw_phase_label.label()));
            Value::Object(row)
        })
        .collect();
    Value::Array(rows)
}

pub fn write_table(path: &Path, frames: &FrameSequence) {
    std::fs::write(path, serde_json::to_string(&table_rows(frames)).unwrap()).unwrap();
}
