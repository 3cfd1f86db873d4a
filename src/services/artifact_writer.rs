use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::models::{FrameSequence, VideoAnalysis};
use crate::services::frame_table::labeled_rows;

/// Files written for one analyzed video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub labeled_table: PathBuf,
    pub phase_durations: PathBuf,
    pub metrics: PathBuf,
    pub processing_info: PathBuf,
}

/// Writes per-video analysis artifacts under one output directory
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Paths used for `video_id`, e.g. `<dir>/<video_id>_metrics.json`
    pub fn paths_for(&self, video_id: &str) -> ArtifactPaths {
        let file = |suffix: &str| self.output_dir.join(format!("{}_{}.json", video_id, suffix));
        ArtifactPaths {
            labeled_table: file("labeled"),
            phase_durations: file("phase_durations"),
            metrics: file("metrics"),
            processing_info: file("processing_info"),
        }
    }

    /// Write the labeled frame table, rounded phase durations, the flat
    /// metrics record and processing info
    pub fn write(&self, frames: &FrameSequence, analysis: &VideoAnalysis) -> Result<ArtifactPaths> {
        std::fs::create_dir_all(&self.output_dir)?;
        let paths = self.paths_for(&analysis.video_id);

        write_json_atomic(&paths.labeled_table, &labeled_rows(frames, &analysis.phases)?)?;
        write_json_atomic(
            &paths.phase_durations,
            &analysis.tug.phase_durations.rounded_report(),
        )?;
        write_json_atomic(&paths.metrics, &analysis.metrics_record())?;
        write_json_atomic(&paths.processing_info, &analysis.processing)?;

        info!(
            "Saved artifacts for {} to {}",
            analysis.video_id,
            self.output_dir.display()
        );
        Ok(paths)
    }
}

/// Serialize `value` as pretty JSON, replacing `path` atomically
///
/// The data goes to a temporary file in the destination directory first, so
/// readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, value)?;
    temp.write_all(b"\n")?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
