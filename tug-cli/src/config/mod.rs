use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tug_analysis::config::AnalysisConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub batch: BatchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Videos analyzed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory for per-video artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Cross-video summary table
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,
}

// Default value functions
fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tug_output")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("tug_output").join("summary.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            batch: BatchSettings::default(),
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            output_dir: default_output_dir(),
            summary_file: default_summary_file(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.tug-analysis/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".tug-analysis"))
    }

    /// Get config file path (~/.tug-analysis/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// `path` when given, otherwise the default location
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_file(),
        }
    }

    /// Load configuration, apply `TUG_*` overrides and validate it
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_file = Self::resolve_path(path)?;

        let mut config = if config_file.exists() {
            let contents = fs::read_to_string(&config_file).with_context(|| {
                format!("Failed to read config file {}", config_file.display())
            })?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };

        config
            .analysis
            .apply_env_overrides()
            .context("Invalid TUG_* environment override")?;
        config
            .analysis
            .validate()
            .context("Invalid analysis configuration")?;

        Ok(config)
    }

    /// Save configuration to `path` (or the default location)
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_file = Self::resolve_path(path)?;
        if let Some(dir) = config_file.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_file, contents).context("Failed to write config file")?;

        Ok(config_file)
    }
}
