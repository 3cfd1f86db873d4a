// Data models for TUG analysis

pub mod analysis;
pub mod frame;
pub mod gait_metrics;
pub mod landmark;
pub mod phase;
pub mod severity;
pub mod summary;

pub use analysis::*;
pub use frame::*;
pub use gait_metrics::*;
pub use landmark::*;
pub use phase::*;
pub use severity::*;
pub use summary::*;
