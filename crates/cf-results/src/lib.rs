//! cf-results: time-indexed field snapshot storage.

pub mod sink;
pub mod store;
pub mod types;

pub use sink::{MemorySink, OutputSink};
pub use store::{FieldStore, StreamWriter};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No stored data at {path}")]
    NotFound { path: String },
}
