//! Run directory storage: a manifest plus one JSONL stream per field.

use crate::sink::OutputSink;
use crate::types::{FieldSnapshot, RunManifest};
use crate::{ResultsError, ResultsResult};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct FieldStore {
    root_dir: PathBuf,
}

impl FieldStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn stream_path(&self, stream: &str) -> PathBuf {
        self.root_dir.join(format!("{stream}.jsonl"))
    }

    pub fn save_manifest(&self, manifest: &RunManifest) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.root_dir.join("manifest.json"), json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<RunManifest> {
        let path = self.root_dir.join("manifest.json");
        if !path.exists() {
            return Err(ResultsError::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Open a stream for writing, truncating any previous contents.
    pub fn writer(&self, stream: &str) -> ResultsResult<StreamWriter> {
        let file = File::create(self.stream_path(stream))?;
        Ok(StreamWriter { file })
    }

    pub fn load_stream(&self, stream: &str) -> ResultsResult<Vec<FieldSnapshot>> {
        let path = self.stream_path(stream);
        if !path.exists() {
            return Err(ResultsError::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        let mut snapshots = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                snapshots.push(serde_json::from_str(line)?);
            }
        }
        Ok(snapshots)
    }
}

/// Appends snapshots to one `.jsonl` stream file.
pub struct StreamWriter {
    file: File,
}

impl OutputSink for StreamWriter {
    fn append(&mut self, snapshot: &FieldSnapshot) -> ResultsResult<()> {
        let line = serde_json::to_string(snapshot)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }
}
