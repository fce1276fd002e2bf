//! One stylesheet build and its watch set

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::compiler::StyleCompiler;
use crate::error::KilnResult;
use crate::output::OutputSink;
use crate::watcher::{Trigger, Watcher};

use super::event::{BuildEvent, EventSink};
use super::importer::DependencyImporter;
use super::scheduler::Rebuild;
use super::watch_set::WatchSet;

/// Compiles one source text to one artifact and owns the watch set that
/// mirrors the imports of the latest successful run.
pub struct StylesheetBuild {
    base_dir: PathBuf,
    source: String,
    out_path: PathBuf,
    compiler: Box<dyn StyleCompiler>,
    watcher: Arc<dyn Watcher>,
    sink: Box<dyn OutputSink>,
    events: Arc<dyn EventSink>,
    watched: WatchSet,
}

impl StylesheetBuild {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        source: impl Into<String>,
        out_path: impl Into<PathBuf>,
        compiler: Box<dyn StyleCompiler>,
        watcher: Arc<dyn Watcher>,
        sink: Box<dyn OutputSink>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            source: source.into(),
            out_path: out_path.into(),
            compiler,
            watcher,
            sink,
            events,
            watched: WatchSet::new(),
        }
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    /// Release every watch. Called once at teardown, after the scheduler
    /// stopped accepting triggers.
    pub fn teardown(&mut self) {
        for (_, guard) in self.watched.drain() {
            guard.unsubscribe();
        }
        self.events.on_event(BuildEvent::WatchStopped);
    }

    fn run(&mut self, trigger: &Trigger) -> KilnResult<()> {
        // Everything watched now is presumed stale until this run consults
        // it again.
        let mut stale: HashSet<PathBuf> = self.watched.paths().cloned().collect();

        let css = {
            let mut importer = DependencyImporter::new(
                &self.base_dir,
                &mut self.watched,
                &mut stale,
                self.watcher.as_ref(),
                trigger,
                self.events.as_ref(),
            );
            self.compiler.render(&self.source, &mut importer)?
        };

        // Only a successful run may shrink the watch set: after a failure
        // the artifact still reflects the old imports, so they stay
        // watched.
        for path in stale {
            if let Some(guard) = self.watched.remove(&path) {
                guard.unsubscribe();
                if self.events.wants_dependency_events() {
                    self.events.on_event(BuildEvent::DependencyDropped {
                        path: path.display().to_string(),
                    });
                }
            }
        }

        self.sink.write(&self.out_path, &css)?;
        Ok(())
    }
}

impl Rebuild for StylesheetBuild {
    fn rebuild(&mut self, trigger: &Trigger) -> KilnResult<()> {
        let started = Instant::now();
        self.events.on_event(BuildEvent::BuildStarted);

        match self.run(trigger) {
            Ok(()) => {
                self.events.on_event(BuildEvent::BuildFinished {
                    output: self.out_path.display().to_string(),
                    dependencies: self.watched.len(),
                    duration_ms: started.elapsed().as_millis() as u64,
                });
                Ok(())
            }
            Err(e) => {
                self.events.on_event(BuildEvent::BuildFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
