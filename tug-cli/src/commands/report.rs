use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tug_analysis::services::{write_json_atomic, SummaryTable};

use crate::config::Config;
use crate::output;

#[derive(Args)]
pub struct ReportCommand {
    /// Summary table to report on
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Also write the report as JSON to this file
    #[arg(long)]
    export: Option<PathBuf>,
}

impl ReportCommand {
    pub async fn execute(self, config: Config) -> Result<()> {
        let summary_path = self.summary.unwrap_or(config.batch.summary_file);
        let table = SummaryTable::load(&summary_path)
            .with_context(|| format!("Failed to load summary {}", summary_path.display()))?;

        let Some(report) = table.report(&config.analysis.severity) else {
            println!("No analyzed videos in {}", summary_path.display());
            return Ok(());
        };

        output::print_report(&report);

        if let Some(export) = self.export {
            write_json_atomic(&export, &report)
                .with_context(|| format!("Failed to export report to {}", export.display()))?;
            println!();
            println!("✓ Report exported to: {}", export.display());
        }

        Ok(())
    }
}
