use anyhow::Result;
use clap::Args;
use tug_analysis::models::TugMetrics;
use tug_analysis::services::SeverityClassifier;

use crate::config::Config;
use crate::output;

#[derive(Args)]
pub struct ClassifyCommand {
    /// Total test duration in seconds
    #[arg(long)]
    total_time: f64,

    /// Turning time divided by walking time
    #[arg(long)]
    ratio: f64,

    /// Total walking time in seconds
    #[arg(long, default_value_t = 0.0)]
    walking_time: f64,

    /// Total turning time in seconds
    #[arg(long, default_value_t = 0.0)]
    turning_time: f64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl ClassifyCommand {
    pub async fn execute(self, config: Config) -> Result<()> {
        let classifier = SeverityClassifier::new(config.analysis.severity)?;
        let metrics = TugMetrics::from_totals(
            self.total_time,
            self.ratio,
            self.walking_time,
            self.turning_time,
        );
        let result = classifier.classify(&metrics);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            output::print_severity(&result);
        }

        Ok(())
    }
}
