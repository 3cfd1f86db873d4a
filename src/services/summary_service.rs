use fs2::FileExt;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SeverityThresholds;
use crate::error::{AnalysisError, Result};
use crate::models::{
    MetricStats, Phase, PhaseStatistics, RiskAssessment, SeverityCount, SeverityDetail,
    SeverityLevel, SummaryReport, SummaryRow,
};
use crate::models::gait_metrics::round_to;
use crate::services::artifact_writer::write_json_atomic;

/// Cross-video results keyed by video id
///
/// Re-analyzing a video replaces its row. On disk the table is a JSON array
/// of rows ordered by video id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    rows: BTreeMap<String, SummaryRow>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `row`, replacing any row with the same video id; returns the
    /// replaced row
    pub fn upsert(&mut self, row: SummaryRow) -> Option<SummaryRow> {
        let previous = self.rows.insert(row.video_id.clone(), row);
        if let Some(old) = &previous {
            debug!("Replaced summary row for {}", old.video_id);
        }
        previous
    }

    pub fn get(&self, video_id: &str) -> Option<&SummaryRow> {
        self.rows.get(video_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in video id order
    pub fn rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.values()
    }

    /// Load a table; a missing file yields an empty table
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No summary table at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let rows: Vec<SummaryRow> = serde_json::from_str(&contents)?;
        let mut table = Self::new();
        for row in rows {
            table.upsert(row);
        }
        Ok(table)
    }

    /// Load the table at `path`, apply `update` and save it, all under an
    /// exclusive lock on `<path>.lock`. Other processes doing the same wait
    /// for the lock, so no writer loses another's rows.
    pub fn update_file<F, R>(path: &Path, update: F) -> Result<R>
    where
        F: FnOnce(&mut SummaryTable) -> R,
    {
        let _lock = SummaryLock::acquire(path)?;
        let mut table = Self::load(path)?;
        let result = update(&mut table);
        table.save(path)?;
        Ok(result)
    }

    /// Write the table atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let rows: Vec<&SummaryRow> = self.rows().collect();
        write_json_atomic(path, &rows)?;
        info!("Saved summary table with {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    /// Aggregate statistics over all rows; `None` for an empty table
    ///
    /// Tests slower than `thresholds.slight_max_time` count toward fall risk.
    pub fn report(&self, thresholds: &SeverityThresholds) -> Option<SummaryReport> {
        if self.rows.is_empty() {
            return None;
        }

        let rows: Vec<&SummaryRow> = self.rows().collect();
        let total = rows.len();
        let percent = |count: usize| count as f64 / total as f64 * 100.0;

        let mut severity_distribution = BTreeMap::new();
        let mut severity_details = BTreeMap::new();
        for level in SeverityLevel::ALL {
            let group: Vec<&SummaryRow> = rows
                .iter()
                .copied()
                .filter(|r| r.severity_level == level)
                .collect();

            severity_distribution.insert(
                level,
                SeverityCount {
                    count: group.len(),
                    percentage: percent(group.len()),
                },
            );

            if group.is_empty() {
                continue;
            }
            let total_times: Vec<f64> = group.iter().map(|r| r.total_time).collect();
            let ratios: Vec<f64> = group.iter().map(|r| r.turn_walk_ratio).collect();
            severity_details.insert(
                level,
                SeverityDetail {
                    count: group.len(),
                    total_time_stats: metric_stats(&total_times),
                    turn_walk_ratio_stats: metric_stats(&ratios),
                    mean_walking_time: group.iter().map(|r| r.total_walking_time).mean(),
                    mean_turning_time: group.iter().map(|r| r.total_turning_time).mean(),
                },
            );
        }

        let high_risk_count = rows.iter().filter(|r| r.severity_level.is_high_risk()).count();
        let fall_risk_count = rows
            .iter()
            .filter(|r| r.total_time > thresholds.slight_max_time)
            .count();

        let mut phase_statistics = BTreeMap::new();
        for phase in Phase::ALL {
            let durations: Vec<f64> = rows
                .iter()
                .map(|r| r.phase_time(phase))
                .filter(|d| *d > 0.0)
                .collect();
            if durations.is_empty() {
                continue;
            }
            let stats = metric_stats(&durations);
            phase_statistics.insert(
                phase,
                PhaseStatistics {
                    average_duration: round_to(stats.mean, 2),
                    min_duration: round_to(stats.min, 2),
                    max_duration: round_to(stats.max, 2),
                    videos_with_phase: durations.len(),
                },
            );
        }

        Some(SummaryReport {
            total_tests: total,
            average_total_time: rows.iter().map(|r| r.total_time).mean(),
            average_turn_walk_ratio: rows.iter().map(|r| r.turn_walk_ratio).mean(),
            severity_distribution,
            severity_details,
            risk_assessment: RiskAssessment {
                high_risk_count,
                high_risk_percentage: percent(high_risk_count),
                fall_risk_count,
                fall_risk_percentage: percent(fall_risk_count),
            },
            phase_statistics,
        })
    }
}

fn metric_stats(values: &[f64]) -> MetricStats {
    let std = if values.len() > 1 {
        Some(values.iter().std_dev())
    } else {
        None
    };
    MetricStats {
        mean: values.iter().mean(),
        std,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Advisory lock on the sidecar file of a summary table, released on drop
struct SummaryLock {
    file: File,
    path: PathBuf,
}

impl SummaryLock {
    fn acquire(table_path: &Path) -> Result<Self> {
        let mut name = table_path.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;
        debug!("Locked {}", path.display());

        Ok(Self { file, path })
    }
}

impl Drop for SummaryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

/// Summary table shared by concurrent video workers
///
/// All writes go through one async mutex, so updates are serialized and the
/// last writer for a video id wins.
#[derive(Debug, Clone, Default)]
pub struct SharedSummary {
    inner: Arc<Mutex<SummaryTable>>,
}

impl SharedSummary {
    pub fn new(table: SummaryTable) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    pub async fn upsert(&self, row: SummaryRow) -> Option<SummaryRow> {
        self.inner.lock().await.upsert(row)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Copy of the current table
    pub async fn snapshot(&self) -> SummaryTable {
        self.inner.lock().await.clone()
    }

    /// Upsert every row into the table stored at `path` under its file lock;
    /// returns the number of rows now on disk
    pub async fn merge_into(&self, path: &Path) -> Result<usize> {
        let rows: Vec<SummaryRow> = self.inner.lock().await.rows().cloned().collect();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            SummaryTable::update_file(&path, |table| {
                for row in rows {
                    table.upsert(row);
                }
                table.len()
            })
        })
        .await
        .map_err(|e| AnalysisError::Io(std::io::Error::other(e)))?
    }
}
