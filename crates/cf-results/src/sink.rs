//! Output sink abstraction.

use crate::ResultsResult;
use crate::types::FieldSnapshot;

/// Receives time-tagged snapshots for one named output stream.
pub trait OutputSink {
    fn append(&mut self, snapshot: &FieldSnapshot) -> ResultsResult<()>;
}

/// Collects snapshots in memory; the test double for the file-backed store.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub snapshots: Vec<FieldSnapshot>,
}

impl OutputSink for MemorySink {
    fn append(&mut self, snapshot: &FieldSnapshot) -> ResultsResult<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}
