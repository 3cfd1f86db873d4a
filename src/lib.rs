// Library exports for TUG analysis

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, ErrorCategory, Result};
pub use services::{RawPhaseSource, RecordedPhaseSource, TugPipeline};
