//! cf-sim: transient driver for the coupled cavity solve.

pub mod driver;
pub mod error;
pub mod progress;

pub use driver::{OutputStreams, RunRecord, StepSummary, run};
pub use error::{SimError, SimResult};
pub use progress::StepProgressEvent;
