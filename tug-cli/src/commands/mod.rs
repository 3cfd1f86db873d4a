mod analyze;
mod batch;
mod classify;
mod config_cmd;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use analyze::AnalyzeCommand;
pub use batch::BatchCommand;
pub use classify::ClassifyCommand;
pub use report::ReportCommand;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "tug-analysis")]
#[command(about = "Timed Up and Go phase segmentation, gait metrics and severity grading", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "TUG_ANALYSIS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single frame table
    Analyze(AnalyzeCommand),

    /// Analyze every frame table in a directory
    Batch(BatchCommand),

    /// Grade severity from known timings
    Classify(ClassifyCommand),

    /// Summarize all analyzed videos
    Report(ReportCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        let config_path = self.config.as_deref();

        match self.command {
            Commands::Analyze(cmd) => cmd.execute(Config::load(config_path)?).await,
            Commands::Batch(cmd) => cmd.execute(Config::load(config_path)?).await,
            Commands::Classify(cmd) => cmd.execute(Config::load(config_path)?).await,
            Commands::Report(cmd) => cmd.execute(Config::load(config_path)?).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path).await,
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force).await,
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
