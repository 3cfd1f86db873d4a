use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tug_analysis::services::{
    video_id_from_path, ArtifactWriter, BatchJob, BatchRunner, RecordedPhaseSource, SharedSummary,
    SummaryTable, TugPipeline,
};

use crate::config::Config;
use crate::output;

#[derive(Args)]
pub struct BatchCommand {
    /// Directory containing frame tables (*.json)
    input_dir: PathBuf,

    /// Videos analyzed at the same time
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Frame rate applied to every recording
    #[arg(long)]
    fps: Option<f64>,

    /// Directory for per-video artifacts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Summary table to update
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl BatchCommand {
    pub async fn execute(self, config: Config) -> Result<()> {
        let jobs = discover_jobs(&self.input_dir, self.fps)?;
        if jobs.is_empty() {
            println!("No frame tables found in {}", self.input_dir.display());
            return Ok(());
        }

        let concurrency = self.concurrency.unwrap_or(config.batch.concurrency);
        let output_dir = self.output_dir.unwrap_or(config.batch.output_dir);
        let summary_path = self.summary.unwrap_or(config.batch.summary_file);

        // Rows from this run only; merged into the file under its lock at the end
        let summary = SharedSummary::new(SummaryTable::new());

        let pipeline = Arc::new(TugPipeline::new(config.analysis)?);

        let progress = ProgressBar::new(jobs.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .context("Invalid progress template")?
                .progress_chars("=> "),
        );
        let bar = progress.clone();

        let runner = BatchRunner::new(pipeline, concurrency)
            .with_artifacts(ArtifactWriter::new(&output_dir))
            .with_progress(move |video_id, ok| {
                let status = if ok { "done" } else { "failed" };
                bar.set_message(format!("{} {}", video_id, status));
                bar.inc(1);
            });

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; finishing videos already in progress");
                ctrl_c.cancel();
            }
        });

        info!(
            "Analyzing {} videos from {}",
            jobs.len(),
            self.input_dir.display()
        );
        let outcome = runner
            .run(jobs, Arc::new(RecordedPhaseSource), &summary, &cancel)
            .await;
        progress.finish_and_clear();

        let videos = summary
            .merge_into(&summary_path)
            .await
            .with_context(|| format!("Failed to update summary {}", summary_path.display()))?;
        info!("Summary table now holds {} videos", videos);

        output::print_batch_outcome(&outcome);
        println!();
        println!("Artifacts: {}", output_dir.display());
        println!("Summary:   {}", summary_path.display());

        Ok(())
    }
}

/// One job per `*.json` file directly inside `dir`, ordered by name
fn discover_jobs(dir: &Path, fps: Option<f64>) -> Result<Vec<BatchJob>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let video_id = video_id_from_path(&path)?;
            Some(BatchJob::from_file(video_id, path, fps))
        })
        .collect())
}
