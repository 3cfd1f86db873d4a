// Analysis services

pub mod artifact_writer;
pub mod batch_service;
pub mod frame_table;
pub mod gait_metrics_service;
pub mod label_smoother;
pub mod peak_detection;
pub mod phase_enforcer;
pub mod pipeline;
pub mod severity_classifier;
pub mod summary_service;

pub use artifact_writer::{write_json_atomic, ArtifactPaths, ArtifactWriter};
pub use batch_service::{BatchFailure, BatchInput, BatchJob, BatchOutcome, BatchRunner};
pub use frame_table::{labeled_rows, missing_gait_landmarks, video_id_from_path, FrameTableReader};
pub use gait_metrics_service::{joint_angle, GaitMetricsExtractor};
pub use label_smoother::{smooth, Label, LabelSmoother};
pub use peak_detection::find_peaks;
pub use phase_enforcer::PhaseEnforcer;
pub use pipeline::{phase_distribution, RawPhaseSource, RecordedPhaseSource, TugPipeline};
pub use severity_classifier::SeverityClassifier;
pub use summary_service::{SharedSummary, SummaryTable};
