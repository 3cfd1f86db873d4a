use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{validate_fps, AnalysisError, Result};
use crate::models::Phase;

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub enforcer: EnforcerConfig,

    #[serde(default)]
    pub gait: GaitConfig,

    #[serde(default)]
    pub severity: SeverityThresholds,

    #[serde(default)]
    pub video: VideoConfig,
}

/// Majority-vote label smoothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Odd window size centered on each frame
    #[serde(default = "default_window")]
    pub window: usize,
}

/// Phase ordering state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcerConfig {
    #[serde(default = "default_phase_order")]
    pub phase_order: Vec<Phase>,

    /// Consecutive satisfying evidence windows required to advance
    #[serde(default = "default_min_persistence")]
    pub min_persistence: usize,

    /// Frames inspected ahead of the current one
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Matches of the next phase needed inside the lookahead window
    #[serde(default = "default_evidence_threshold")]
    pub evidence_threshold: usize,
}

/// Gait metric extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Minimum frames between two detected steps
    #[serde(default = "default_peak_min_distance")]
    pub peak_min_distance: usize,

    /// Floor applied to every denominator
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

/// Cutoffs of the severity decision table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    /// Seconds; at or below counts as normal mobility
    #[serde(default = "default_normal_max_time")]
    pub normal_max_time: f64,

    /// Seconds; above is the fall-risk range
    #[serde(default = "default_slight_max_time")]
    pub slight_max_time: f64,

    /// Seconds; upper bound of Moderate when turning is not dominant
    #[serde(default = "default_moderate_max_time")]
    pub moderate_max_time: f64,

    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: f64,

    /// Seconds of walking or turning considered impaired
    #[serde(default = "default_impairment_time")]
    pub impairment_time: f64,
}

/// Input video assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Frame rate used when the input does not carry one
    #[serde(default = "default_fps")]
    pub default_fps: f64,

    #[serde(default = "default_true")]
    pub require_contiguous_frames: bool,
}

// Default value functions
fn default_window() -> usize {
    7
}

fn default_phase_order() -> Vec<Phase> {
    Phase::ALL.to_vec()
}

fn default_min_persistence() -> usize {
    5
}

fn default_lookahead() -> usize {
    5
}

fn default_evidence_threshold() -> usize {
    3
}

fn default_peak_min_distance() -> usize {
    10
}

fn default_epsilon() -> f64 {
    1e-6
}

fn default_normal_max_time() -> f64 {
    7.0
}

fn default_slight_max_time() -> f64 {
    13.0
}

fn default_moderate_max_time() -> f64 {
    20.0
}

fn default_ratio_threshold() -> f64 {
    1.0
}

fn default_impairment_time() -> f64 {
    4.0
}

fn default_fps() -> f64 {
    30.0
}

fn default_true() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            enforcer: EnforcerConfig::default(),
            gait: GaitConfig::default(),
            severity: SeverityThresholds::default(),
            video: VideoConfig::default(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            phase_order: default_phase_order(),
            min_persistence: default_min_persistence(),
            lookahead: default_lookahead(),
            evidence_threshold: default_evidence_threshold(),
        }
    }
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            peak_min_distance: default_peak_min_distance(),
            epsilon: default_epsilon(),
        }
    }
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            normal_max_time: default_normal_max_time(),
            slight_max_time: default_slight_max_time(),
            moderate_max_time: default_moderate_max_time(),
            ratio_threshold: default_ratio_threshold(),
            impairment_time: default_impairment_time(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            default_fps: default_fps(),
            require_contiguous_frames: default_true(),
        }
    }
}

impl AnalysisConfig {
    /// Override individual knobs from the environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(window) = env_parse::<usize>("TUG_SMOOTHING_WINDOW")? {
            self.smoothing.window = window;
        }
        if let Some(persistence) = env_parse::<usize>("TUG_MIN_PERSISTENCE")? {
            self.enforcer.min_persistence = persistence;
        }
        if let Some(lookahead) = env_parse::<usize>("TUG_LOOKAHEAD")? {
            self.enforcer.lookahead = lookahead;
        }
        if let Some(threshold) = env_parse::<usize>("TUG_EVIDENCE_THRESHOLD")? {
            self.enforcer.evidence_threshold = threshold;
        }
        if let Some(distance) = env_parse::<usize>("TUG_PEAK_MIN_DISTANCE")? {
            self.gait.peak_min_distance = distance;
        }
        if let Some(fps) = env_parse::<f64>("TUG_DEFAULT_FPS")? {
            self.video.default_fps = fps;
        }
        Ok(())
    }

    /// Reject invalid values before any video is processed
    pub fn validate(&self) -> Result<()> {
        self.smoothing.validate()?;
        self.enforcer.validate()?;
        self.gait.validate()?;
        self.severity.validate()?;
        validate_fps(self.video.default_fps)?;
        Ok(())
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 || self.window % 2 == 0 {
            return Err(AnalysisError::InvalidWindow(self.window));
        }
        Ok(())
    }
}

impl EnforcerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.phase_order.len() != Phase::ALL.len() {
            return Err(AnalysisError::InvalidPhaseOrder(self.phase_order.len()));
        }
        for (i, phase) in self.phase_order.iter().enumerate() {
            if self.phase_order[..i].contains(phase) {
                return Err(AnalysisError::DuplicatePhase(*phase));
            }
        }
        if self.min_persistence == 0 {
            return Err(AnalysisError::InvalidPersistence(self.min_persistence));
        }
        if self.lookahead == 0 {
            return Err(AnalysisError::InvalidLookahead(self.lookahead));
        }
        if self.evidence_threshold == 0 || self.evidence_threshold > self.lookahead {
            return Err(AnalysisError::InvalidEvidenceThreshold {
                threshold: self.evidence_threshold,
                lookahead: self.lookahead,
            });
        }
        Ok(())
    }
}

impl GaitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.peak_min_distance == 0 {
            return Err(AnalysisError::InvalidPeakDistance(self.peak_min_distance));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

impl SeverityThresholds {
    pub fn validate(&self) -> Result<()> {
        let times = [
            self.normal_max_time,
            self.slight_max_time,
            self.moderate_max_time,
        ];
        if times.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "severity time thresholds must be positive".to_string(),
            ));
        }
        if !(self.normal_max_time <= self.slight_max_time
            && self.slight_max_time <= self.moderate_max_time)
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "severity time thresholds must be ascending, got {} / {} / {}",
                self.normal_max_time, self.slight_max_time, self.moderate_max_time
            )));
        }
        if !self.ratio_threshold.is_finite() || self.ratio_threshold <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "turn-walk ratio threshold must be positive, got {}",
                self.ratio_threshold
            )));
        }
        if !self.impairment_time.is_finite() || self.impairment_time < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "impairment time must be non-negative, got {}",
                self.impairment_time
            )));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AnalysisError::InvalidConfig(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
