//! Dependency watch set

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::watcher::WatchGuard;

/// The set of files the current artifact depends on, each holding the
/// guard that cancels its watch subscription.
///
/// Keys are canonical absolute paths; callers normalize before touching
/// the set. Membership must be checked before `insert`: a path can only
/// hold one guard.
#[derive(Debug, Default)]
pub struct WatchSet {
    entries: HashMap<PathBuf, WatchGuard>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: PathBuf, guard: WatchGuard) {
        debug_assert!(
            !self.entries.contains_key(&path),
            "watch set already tracks {}",
            path.display()
        );
        self.entries.insert(path, guard);
    }

    /// Remove one entry, handing back its guard.
    pub fn remove(&mut self, path: &Path) -> Option<WatchGuard> {
        self.entries.remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the set, handing back every guard.
    pub fn drain(&mut self) -> Vec<(PathBuf, WatchGuard)> {
        self.entries.drain().collect()
    }
}
