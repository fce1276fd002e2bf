//! In-memory watcher for tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::paths::normalize;

use super::{Trigger, WatchGuard, Watcher};

/// Test watcher with a hand-driven change feed.
///
/// Subscriptions are keyed by normalized path. [`FakeWatcher::emit`] invokes
/// the callbacks registered for a path synchronously on the calling thread,
/// so tests observe rebuild side effects as soon as `emit` returns.
#[derive(Default)]
pub struct FakeWatcher {
    registry: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscriptions: HashMap<PathBuf, Vec<(u64, Trigger)>>,
}

impl FakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions across all paths.
    pub fn active(&self) -> usize {
        self.registry
            .lock()
            .unwrap()
            .subscriptions
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Paths with at least one live subscription, sorted.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .registry
            .lock()
            .unwrap()
            .subscriptions
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.registry
            .lock()
            .unwrap()
            .subscriptions
            .contains_key(&normalize(path))
    }

    /// Fire a change for `path`, invoking its subscribers synchronously.
    ///
    /// Callbacks run after the registry lock is released, so a callback may
    /// subscribe and unsubscribe freely.
    pub fn emit(&self, path: &Path) {
        let triggers: Vec<Trigger> = {
            let registry = self.registry.lock().unwrap();
            registry
                .subscriptions
                .get(&normalize(path))
                .map(|subs| subs.iter().map(|(_, t)| Arc::clone(t)).collect())
                .unwrap_or_default()
        };
        for trigger in triggers {
            trigger();
        }
    }
}

impl Watcher for FakeWatcher {
    fn watch(&self, path: &Path, callback: Trigger) -> WatchGuard {
        let path = normalize(path);
        let id = {
            let mut registry = self.registry.lock().unwrap();
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .subscriptions
                .entry(path.clone())
                .or_default()
                .push((id, callback));
            id
        };

        let registry = Arc::clone(&self.registry);
        WatchGuard::new(move || {
            let mut registry = registry.lock().unwrap();
            if let Some(subs) = registry.subscriptions.get_mut(&path) {
                subs.retain(|(sub_id, _)| *sub_id != id);
                if subs.is_empty() {
                    registry.subscriptions.remove(&path);
                }
            }
        })
    }
}
