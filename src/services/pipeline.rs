/// TUG analysis pipeline
///
/// Runs one video through the full chain:
/// raw predictions -> smoothing -> phase enforcement -> gait metrics ->
/// TUG timings -> severity. Every stage returns a new value; nothing is
/// shared between videos, so one pipeline can serve many threads.

use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{
    EnforcedSequence, FrameSequence, Phase, PhaseShare, ProcessingInfo, TugMetrics, VideoAnalysis,
};
use crate::services::gait_metrics_service::GaitMetricsExtractor;
use crate::services::label_smoother::LabelSmoother;
use crate::services::phase_enforcer::PhaseEnforcer;
use crate::services::severity_classifier::SeverityClassifier;

/// Supplier of per-frame phase predictions for a video
///
/// The frame classifier lives outside this crate; implementations wrap
/// whatever produced the predictions. The caller owns the source and
/// passes it to the pipeline by reference.
#[cfg_attr(test, mockall::automock)]
pub trait RawPhaseSource {
    /// One prediction per frame, in frame order
    fn raw_phases(&self, frames: &FrameSequence) -> Result<Vec<Phase>>;
}

/// Predictions recorded alongside the landmarks in the frame table
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedPhaseSource;

impl RawPhaseSource for RecordedPhaseSource {
    fn raw_phases(&self, frames: &FrameSequence) -> Result<Vec<Phase>> {
        Ok(frames.raw_phases())
    }
}

#[derive(Debug)]
pub struct TugPipeline {
    config: AnalysisConfig,
    smoother: LabelSmoother,
    enforcer: PhaseEnforcer,
    extractor: GaitMetricsExtractor,
    classifier: SeverityClassifier,
}

impl TugPipeline {
    /// Build every stage up front; configuration errors surface here
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            smoother: LabelSmoother::new(config.smoothing.window)?,
            enforcer: PhaseEnforcer::new(&config.enforcer)?,
            extractor: GaitMetricsExtractor::new(&config.gait)?,
            classifier: SeverityClassifier::new(config.severity.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier(&self) -> &SeverityClassifier {
        &self.classifier
    }

    /// Smooth and order raw predictions into the final segmentation
    pub fn segment(&self, raw: &[Phase]) -> EnforcedSequence {
        let smoothed = self.smoother.smooth_sequence(raw);
        debug!("Smoothed {} frames (window {})", smoothed.len(), self.smoother.window());
        self.enforcer.enforce_sequence(&smoothed)
    }

    /// Analyze one video
    pub fn analyze<S>(&self, source: &S, frames: &FrameSequence) -> Result<VideoAnalysis>
    where
        S: RawPhaseSource + ?Sized,
    {
        let started = Instant::now();
        info!(
            "Analyzing video {} ({} frames at {} fps)",
            frames.video_id(),
            frames.len(),
            frames.fps()
        );
        if frames.is_empty() {
            warn!("Video {} has no frames", frames.video_id());
        }

        let raw = source.raw_phases(frames)?;
        if raw.len() != frames.len() {
            return Err(AnalysisError::LengthMismatch {
                expected: frames.len(),
                actual: raw.len(),
            });
        }

        let raw_distribution = phase_distribution(&raw);
        for (phase, share) in &raw_distribution {
            debug!(
                "Raw predictions for {}: {} frames ({:.1}%)",
                phase, share.frames, share.percentage
            );
        }

        let phases = self.segment(&raw);
        let gait = self.extractor.extract(frames, &phases)?;
        let tug = TugMetrics::from_durations(gait.phase_durations, self.config.gait.epsilon);
        let severity = self.classifier.classify(&tug);

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            "Video {}: {:.2}s total, {} ({}) in {}ms",
            frames.video_id(),
            tug.total_time,
            severity.level,
            severity.score,
            processing_time_ms
        );

        Ok(VideoAnalysis {
            video_id: frames.video_id().to_string(),
            phases,
            gait,
            tug,
            severity,
            processing: ProcessingInfo {
                total_frames: frames.len(),
                fps: frames.fps(),
                processing_time_ms,
                analyzed_at: Utc::now(),
                raw_distribution,
            },
        })
    }
}

/// Frames and share of each predicted phase
pub fn phase_distribution(phases: &[Phase]) -> BTreeMap<Phase, PhaseShare> {
    let mut counts: BTreeMap<Phase, usize> = BTreeMap::new();
    for phase in phases {
        *counts.entry(*phase).or_insert(0) += 1;
    }

    let total = phases.len() as f64;
    counts
        .into_iter()
        .map(|(phase, frames)| {
            (
                phase,
                PhaseShare {
                    frames,
                    percentage: frames as f64 / total * 100.0,
                },
            )
        })
        .collect()
}
