use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use tug_analysis::services::{
    ArtifactWriter, FrameTableReader, RecordedPhaseSource, SummaryTable, TugPipeline,
};

use crate::config::Config;
use crate::output;

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Frame table (JSON array of per-frame rows)
    input: PathBuf,

    /// Video identifier (defaults to the file name without extension)
    #[arg(long)]
    video_id: Option<String>,

    /// Frame rate of the recording
    #[arg(long)]
    fps: Option<f64>,

    /// Directory for the labeled table and metric files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Summary table to update
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Do not update the summary table
    #[arg(long, conflicts_with = "summary")]
    no_summary: bool,

    /// Print the metrics record as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl AnalyzeCommand {
    pub async fn execute(self, config: Config) -> Result<()> {
        let pipeline = TugPipeline::new(config.analysis.clone())?;
        let reader = FrameTableReader::new(&config.analysis.video);

        let frames = reader
            .read_path(&self.input, self.video_id.as_deref(), self.fps)
            .with_context(|| format!("Failed to load frame table {}", self.input.display()))?;

        let analysis = pipeline
            .analyze(&RecordedPhaseSource, &frames)
            .with_context(|| format!("Failed to analyze {}", frames.video_id()))?;

        let output_dir = self.output_dir.unwrap_or(config.batch.output_dir);
        let paths = ArtifactWriter::new(&output_dir)
            .write(&frames, &analysis)
            .context("Failed to write analysis artifacts")?;

        if !self.no_summary {
            let summary_path = self.summary.unwrap_or(config.batch.summary_file);
            let row = analysis.summary_row();
            let videos = SummaryTable::update_file(&summary_path, |table| {
                table.upsert(row);
                table.len()
            })
            .with_context(|| format!("Failed to update summary {}", summary_path.display()))?;
            info!("Summary table now holds {} videos", videos);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analysis.metrics_record())?);
        } else {
            output::print_analysis(&analysis);
            println!();
            println!("Labeled frames: {}", paths.labeled_table.display());
            println!("Metrics:        {}", paths.metrics.display());
        }

        Ok(())
    }
}
