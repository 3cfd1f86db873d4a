/// Batch Analysis Service
///
/// Analyzes many videos concurrently. Each video runs the synchronous
/// pipeline on the blocking thread pool, bounded by a semaphore. Results are
/// upserted into the shared summary as they complete; a failing video is
/// recorded and the batch carries on. Cancelling the token stops new videos
/// from being dispatched while in-flight ones finish.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{ErrorCategory, Result};
use crate::models::{FrameSequence, VideoAnalysis};
use crate::services::artifact_writer::ArtifactWriter;
use crate::services::frame_table::FrameTableReader;
use crate::services::pipeline::{RawPhaseSource, TugPipeline};
use crate::services::summary_service::SharedSummary;

/// Where a batch video's frames come from
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// Frame table on disk, with an optional frame rate override
    File { path: PathBuf, fps: Option<f64> },
    /// Frames already in memory
    Frames(FrameSequence),
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub video_id: String,
    pub input: BatchInput,
}

impl BatchJob {
    pub fn from_file(video_id: impl Into<String>, path: impl Into<PathBuf>, fps: Option<f64>) -> Self {
        Self {
            video_id: video_id.into(),
            input: BatchInput::File {
                path: path.into(),
                fps,
            },
        }
    }

    pub fn from_frames(frames: FrameSequence) -> Self {
        Self {
            video_id: frames.video_id().to_string(),
            input: BatchInput::Frames(frames),
        }
    }
}

/// A video that could not be analyzed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub video_id: String,
    pub error: String,
    /// `None` when the worker itself failed (e.g. panicked)
    pub category: Option<ErrorCategory>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful analyses ordered by video id
    pub analyses: Vec<VideoAnalysis>,
    pub failures: Vec<BatchFailure>,
    /// Videos never dispatched because the batch was cancelled
    pub skipped: Vec<String>,
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        self.analyses.len() + self.failures.len()
    }
}

type ProgressFn = dyn Fn(&str, bool) + Send + Sync;

pub struct BatchRunner {
    pipeline: Arc<TugPipeline>,
    reader: FrameTableReader,
    artifacts: Option<Arc<ArtifactWriter>>,
    concurrency: usize,
    progress: Option<Arc<ProgressFn>>,
}

impl BatchRunner {
    pub fn new(pipeline: Arc<TugPipeline>, concurrency: usize) -> Self {
        let reader = FrameTableReader::new(&pipeline.config().video);
        Self {
            pipeline,
            reader,
            artifacts: None,
            concurrency: concurrency.max(1),
            progress: None,
        }
    }

    /// Write per-video artifacts for every successful analysis
    pub fn with_artifacts(mut self, writer: ArtifactWriter) -> Self {
        self.artifacts = Some(Arc::new(writer));
        self
    }

    /// Called once per finished video with its id and whether it succeeded
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run all jobs, collecting successes, failures and skipped videos
    pub async fn run<S>(
        &self,
        jobs: Vec<BatchJob>,
        source: Arc<S>,
        summary: &SharedSummary,
        cancel: &CancellationToken,
    ) -> BatchOutcome
    where
        S: RawPhaseSource + Send + Sync + 'static,
    {
        info!(
            "Starting batch of {} videos with concurrency {}",
            jobs.len(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut outcome = BatchOutcome::default();
        let mut pending = jobs.into_iter();
        // Videos whose task has not reported back yet
        let mut in_flight: BTreeMap<String, usize> = BTreeMap::new();

        while let Some(job) = pending.next() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                outcome.skipped.push(job.video_id);
                outcome.skipped.extend(pending.by_ref().map(|j| j.video_id));
                break;
            };

            *in_flight.entry(job.video_id.clone()).or_default() += 1;
            let pipeline = Arc::clone(&self.pipeline);
            let reader = self.reader.clone();
            let artifacts = self.artifacts.clone();
            let source = Arc::clone(&source);
            let summary = summary.clone();
            let progress = self.progress.clone();

            tasks.spawn(async move {
                let video_id = job.video_id.clone();
                let result = tokio::task::spawn_blocking(move || {
                    analyze_job(&pipeline, &reader, artifacts.as_deref(), source.as_ref(), job)
                })
                .await;
                drop(permit);

                let result = match result {
                    Ok(Ok(analysis)) => {
                        summary.upsert(analysis.summary_row()).await;
                        Ok(analysis)
                    }
                    Ok(Err(e)) => Err(BatchFailure {
                        video_id: video_id.clone(),
                        error: e.to_string(),
                        category: Some(e.category()),
                    }),
                    Err(join_error) => Err(BatchFailure {
                        video_id: video_id.clone(),
                        error: format!("worker failed: {}", join_error),
                        category: None,
                    }),
                };

                if let Some(progress) = progress {
                    progress(&video_id, result.is_ok());
                }
                result
            });
        }

        if !outcome.skipped.is_empty() {
            warn!(
                "Batch cancelled; {} videos were not started",
                outcome.skipped.len()
            );
        }

        let mut task_errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let finished = match joined {
                Ok(Ok(analysis)) => {
                    let video_id = analysis.video_id.clone();
                    outcome.analyses.push(analysis);
                    video_id
                }
                Ok(Err(failure)) => {
                    error!(
                        "Failed to analyze {}: {}",
                        failure.video_id, failure.error
                    );
                    let video_id = failure.video_id.clone();
                    outcome.failures.push(failure);
                    video_id
                }
                Err(e) => {
                    error!("Batch task failed: {}", e);
                    task_errors.push(e.to_string());
                    continue;
                }
            };
            if let Some(count) = in_flight.get_mut(&finished) {
                *count -= 1;
                if *count == 0 {
                    in_flight.remove(&finished);
                }
            }
        }

        // A task that died never reported its video; charge each lost video
        // with one of the task errors
        let mut task_errors = task_errors.into_iter();
        for (video_id, count) in in_flight {
            for _ in 0..count {
                let error = task_errors
                    .next()
                    .unwrap_or_else(|| "worker task did not report".to_string());
                outcome.failures.push(BatchFailure {
                    video_id: video_id.clone(),
                    error: format!("worker failed: {}", error),
                    category: None,
                });
            }
        }

        outcome.analyses.sort_by(|a, b| a.video_id.cmp(&b.video_id));
        outcome.failures.sort_by(|a, b| a.video_id.cmp(&b.video_id));

        info!(
            "Batch finished: {} succeeded, {} failed, {} skipped",
            outcome.analyses.len(),
            outcome.failures.len(),
            outcome.skipped.len()
        );
        outcome
    }
}

fn analyze_job<S>(
    pipeline: &TugPipeline,
    reader: &FrameTableReader,
    artifacts: Option<&ArtifactWriter>,
    source: &S,
    job: BatchJob,
) -> Result<VideoAnalysis>
where
    S: RawPhaseSource + ?Sized,
{
    let frames = match job.input {
        BatchInput::File { path, fps } => reader.read_path(&path, Some(&job.video_id), fps)?,
        BatchInput::Frames(frames) => frames,
    };
    let analysis = pipeline.analyze(source, &frames)?;
    if let Some(writer) = artifacts {
        writer.write(&frames, &analysis)?;
    }
    Ok(analysis)
}
