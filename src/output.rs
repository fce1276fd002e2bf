//! Artifact output port
//!
//! The engine writes the compiled artifact through `OutputSink`.
//! [`FsSink`] persists atomically (tempfile + rename) so a crash mid-write
//! never leaves a truncated artifact; [`MemorySink`] captures writes for
//! tests.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{KilnError, KilnResult};

pub trait OutputSink: Send {
    fn write(&self, path: &Path, contents: &str) -> KilnResult<()>;
}

/// Writes artifacts to disk atomically.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl FsSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for FsSink {
    fn write(&self, path: &Path, contents: &str) -> KilnResult<()> {
        let output_error = |source: std::io::Error| KilnError::Output {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(output_error)?;

        // Same filesystem as the destination, so the rename is atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(output_error)?;
        tmp.write_all(contents.as_bytes()).map_err(output_error)?;
        tmp.persist(path).map_err(|e| output_error(e.error))?;

        Ok(())
    }
}

/// In-memory sink for tests. Clones share the same store.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    writes: Arc<Mutex<Vec<PathBuf>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Total writes accepted, including overwrites.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, path: &Path, contents: &str) -> KilnResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        self.writes.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
