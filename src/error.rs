use thiserror::Error;

use crate::models::Phase;

/// Broad classes of failure, used by batch runners to report why a video
/// was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid parameters supplied by the caller
    Configuration,
    /// Input data that breaks the upstream contract
    DataValidation,
    /// Filesystem or serialization failure
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::DataValidation => write!(f, "data_validation"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Phase order must contain exactly 6 phases, got {0}")]
    InvalidPhaseOrder(usize),
    #[error("Phase order lists {0} more than once")]
    DuplicatePhase(Phase),
    #[error("Smoothing window must be an odd integer >= 1, got {0}")]
    InvalidWindow(usize),
    #[error("Frame rate must be a positive finite number, got {0}")]
    InvalidFps(f64),
    #[error("Minimum persistence must be >= 1, got {0}")]
    InvalidPersistence(usize),
    #[error("Lookahead must be >= 1, got {0}")]
    InvalidLookahead(usize),
    #[error("Evidence threshold must be between 1 and the lookahead ({lookahead}), got {threshold}")]
    InvalidEvidenceThreshold { threshold: usize, lookahead: usize },
    #[error("Peak separation must be >= 1 frame, got {0}")]
    InvalidPeakDistance(usize),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame index {current} does not follow {previous}")]
    NonIncreasingFrame { previous: u64, current: u64 },
    #[error("Frame index gap: {previous} is followed by {current}")]
    FrameGap { previous: u64, current: u64 },
    #[error("Frame {frame} has no landmark {landmark}")]
    MissingLandmark { frame: u64, landmark: u8 },
    #[error("Unknown phase label '{label}' at frame {frame}")]
    UnknownPhaseLabel { frame: u64, label: String },
    #[error("Malformed frame row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
    #[error("Sequence length mismatch: expected {expected} frames, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Video identifier cannot be empty")]
    EmptyVideoId,
    #[error("Phase sequence moves backwards at position {position}: {from} -> {to}")]
    PhaseRegression { position: usize, from: Phase, to: Phase },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::InvalidPhaseOrder(_)
            | AnalysisError::DuplicatePhase(_)
            | AnalysisError::InvalidWindow(_)
            | AnalysisError::InvalidFps(_)
            | AnalysisError::InvalidPersistence(_)
            | AnalysisError::InvalidLookahead(_)
            | AnalysisError::InvalidEvidenceThreshold { .. }
            | AnalysisError::InvalidPeakDistance(_)
            | AnalysisError::InvalidConfig(_) => ErrorCategory::Configuration,
            AnalysisError::NonIncreasingFrame { .. }
            | AnalysisError::FrameGap { .. }
            | AnalysisError::MissingLandmark { .. }
            | AnalysisError::UnknownPhaseLabel { .. }
            | AnalysisError::MalformedRow { .. }
            | AnalysisError::LengthMismatch { .. }
            | AnalysisError::EmptyVideoId
            | AnalysisError::PhaseRegression { .. } => ErrorCategory::DataValidation,
            AnalysisError::Io(_) | AnalysisError::Json(_) => ErrorCategory::Io,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Reject a frame rate that is zero, negative or not finite.
pub fn validate_fps(fps: f64) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(AnalysisError::InvalidFps(fps));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            AnalysisError::InvalidPhaseOrder(4).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            AnalysisError::MissingLandmark { frame: 3, landmark: 27 }.category(),
            ErrorCategory::DataValidation
        );
        assert!(AnalysisError::InvalidWindow(4).is_configuration_error());
        assert!(!AnalysisError::EmptyVideoId.is_configuration_error());
    }

    #[test]
    fn test_validate_fps() {
        assert!(validate_fps(30.0).is_ok());
        assert!(validate_fps(0.0).is_err());
        assert!(validate_fps(-1.0).is_err());
        assert!(validate_fps(f64::NAN).is_err());
        assert!(validate_fps(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::FrameGap { previous: 4, current: 7 };
        assert_eq!(err.to_string(), "Frame index gap: 4 is followed by 7");
    }
}
