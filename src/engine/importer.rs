//! Import resolution hook
//!
//! One hook is constructed per run and handed to the compiler. Each import
//! the compiler consults flows through [`DependencyImporter::resolve`],
//! which keeps the watch set in step with what this run actually uses:
//! first sighting of a path subscribes it, a revisit rescues it from the
//! stale snapshot taken at the start of the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::{Importer, Issuer};
use crate::paths::{absolutize, normalize};
use crate::watcher::{Trigger, Watcher};

use super::event::{BuildEvent, EventSink};
use super::watch_set::WatchSet;

pub struct DependencyImporter<'a> {
    base_dir: &'a Path,
    watched: &'a mut WatchSet,
    stale: &'a mut HashSet<PathBuf>,
    watcher: &'a dyn Watcher,
    trigger: &'a Trigger,
    events: &'a dyn EventSink,
}

impl<'a> DependencyImporter<'a> {
    pub fn new(
        base_dir: &'a Path,
        watched: &'a mut WatchSet,
        stale: &'a mut HashSet<PathBuf>,
        watcher: &'a dyn Watcher,
        trigger: &'a Trigger,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            base_dir,
            watched,
            stale,
            watcher,
            trigger,
            events,
        }
    }

    /// Canonical absolute form of one specifier.
    fn canonicalize(&self, specifier: &str, issuer: Issuer<'_>) -> PathBuf {
        let spec = Path::new(specifier);
        if spec.is_absolute() {
            return normalize(spec);
        }
        match issuer {
            Issuer::Root => absolutize(self.base_dir, spec),
            Issuer::File(file) => {
                let file = absolutize(self.base_dir, file);
                match file.parent() {
                    Some(dir) => absolutize(dir, spec),
                    None => absolutize(self.base_dir, spec),
                }
            }
        }
    }
}

impl Importer for DependencyImporter<'_> {
    fn resolve(&mut self, specifier: &str, issuer: Issuer<'_>) -> PathBuf {
        let resolved = self.canonicalize(specifier, issuer);

        if self.watched.contains(&resolved) {
            // Still in use; spare it from post-run reconciliation.
            self.stale.remove(&resolved);
        } else {
            let guard = self.watcher.watch(&resolved, Arc::clone(self.trigger));
            self.watched.insert(resolved.clone(), guard);
            if self.events.wants_dependency_events() {
                self.events.on_event(BuildEvent::DependencyAdded {
                    path: resolved.display().to_string(),
                });
            }
        }

        resolved
    }
}
