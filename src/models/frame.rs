/// Frame sequence models
///
/// A `FrameSequence` is the read-only input for one video. Each analysis
/// stage produces a new sequence of the same length: `SmoothedSequence`,
/// then `EnforcedSequence`.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{validate_fps, AnalysisError, Result};
use crate::models::landmark::Landmarks;
use crate::models::phase::Phase;

/// One video frame as produced by the pose and classifier stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_index: u64,
    pub landmarks: Landmarks,
    /// Classifier output before smoothing
    pub raw_phase_label: Phase,
}

impl FrameRecord {
    pub fn new(frame_index: u64, landmarks: Landmarks, raw_phase_label: Phase) -> Self {
        Self {
            frame_index,
            landmarks,
            raw_phase_label,
        }
    }
}

/// Ordered frames of a single video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSequence {
    video_id: String,
    fps: f64,
    frames: Vec<FrameRecord>,
}

impl FrameSequence {
    /// Build a sequence, rejecting non-increasing or non-contiguous frame
    /// indices.
    pub fn new(video_id: impl Into<String>, fps: f64, frames: Vec<FrameRecord>) -> Result<Self> {
        Self::with_contiguity(video_id, fps, frames, true)
    }

    /// Build a sequence; when `require_contiguous` is false, gaps between
    /// frame indices are accepted but ordering is still enforced.
    pub fn with_contiguity(
        video_id: impl Into<String>,
        fps: f64,
        frames: Vec<FrameRecord>,
        require_contiguous: bool,
    ) -> Result<Self> {
        let video_id = video_id.into();
        if video_id.trim().is_empty() {
            return Err(AnalysisError::EmptyVideoId);
        }
        validate_fps(fps)?;

        for pair in frames.windows(2) {
            let previous = pair[0].frame_index;
            let current = pair[1].frame_index;
            if current <= previous {
                return Err(AnalysisError::NonIncreasingFrame { previous, current });
            }
            if require_contiguous && current != previous + 1 {
                return Err(AnalysisError::FrameGap { previous, current });
            }
        }

        Ok(Self {
            video_id,
            fps,
            frames,
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Classifier predictions in frame order
    pub fn raw_phases(&self) -> Vec<Phase> {
        self.frames.iter().map(|f| f.raw_phase_label).collect()
    }

    /// Duration covered by the sequence in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.frames.len() as f64 / self.fps
    }
}

/// Per-frame phases after majority-vote smoothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SmoothedSequence(Vec<Phase>);

impl SmoothedSequence {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self(phases)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Monotonically ordered per-frame phases; the canonical segmentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnforcedSequence(Vec<Phase>);

impl EnforcedSequence {
    pub(crate) fn from_enforcer(phases: Vec<Phase>) -> Self {
        Self(phases)
    }

    /// Accept an externally produced segmentation after checking that the
    /// phase index never decreases.
    pub fn try_from_phases(phases: Vec<Phase>) -> Result<Self> {
        for (position, pair) in phases.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(AnalysisError::PhaseRegression {
                    position: position + 1,
                    from: pair[0],
                    to: pair[1],
                });
            }
        }
        Ok(Self(phases))
    }

    pub fn phases(&self) -> &[Phase] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Frame ranges occupied by each phase
    pub fn partition(&self) -> PhasePartition {
        let mut ranges: [Range<usize>; 6] = Default::default();
        let mut start = 0;
        while start < self.0.len() {
            let phase = self.0[start];
            let mut end = start + 1;
            while end < self.0.len() && self.0[end] == phase {
                end += 1;
            }
            ranges[phase.index()] = start..end;
            start = end;
        }
        PhasePartition { ranges }
    }
}

impl<'de> Deserialize<'de> for EnforcedSequence {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let phases = Vec::<Phase>::deserialize(deserializer)?;
        EnforcedSequence::try_from_phases(phases).map_err(serde::de::Error::custom)
    }
}

/// Contiguous frame ranges of the six phases (empty when a phase is absent)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePartition {
    ranges: [Range<usize>; 6],
}

impl PhasePartition {
    pub fn range(&self, phase: Phase) -> Range<usize> {
        self.ranges[phase.index()].clone()
    }

    pub fn frame_count(&self, phase: Phase) -> usize {
        self.ranges[phase.index()].len()
    }

    /// Positions of all walking frames in order (WalkFromChair then
    /// WalkToChair)
    pub fn walking_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.range(Phase::WalkFromChair)
            .chain(self.range(Phase::WalkToChair))
    }
}
