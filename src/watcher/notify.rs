//! OS file watcher backed by `notify`
//!
//! Subscriptions are per file, but the backend watches parent directories:
//! editors that save by rename would otherwise detach a direct file watch.
//! Directory watches are refcounted across subscriptions.
//!
//! A dispatch thread drains backend events, debounces them, and drops
//! changes whose content hash is unchanged (IDE auto-save noise) before
//! invoking subscriber callbacks.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as _};

use crate::error::KilnResult;
use crate::paths::normalize;

use super::{Trigger, WatchGuard, Watcher};

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

pub struct NotifyWatcher {
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    registry: Mutex<Registry>,
    backend: Mutex<RecommendedWatcher>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// File path -> subscriber callbacks
    subscriptions: HashMap<PathBuf, Vec<(u64, Trigger)>>,
    /// Directory watch refcounts; the backend watch is removed at zero
    dir_watches: HashMap<PathBuf, usize>,
    /// Content hash at subscribe time or last dispatch
    content_hashes: HashMap<PathBuf, String>,
}

impl NotifyWatcher {
    /// Start the backend and the dispatch thread.
    pub fn spawn() -> KilnResult<Self> {
        let (tx, rx) = channel();

        let backend = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            },
            Config::default(),
        )
        .map_err(|e| crate::error::KilnError::Io(std::io::Error::other(e.to_string())))?;

        let shared = Arc::new(Shared {
            registry: Mutex::new(Registry::default()),
            backend: Mutex::new(backend),
        });

        let running = Arc::new(AtomicBool::new(true));
        let worker = std::thread::spawn({
            let shared = Arc::clone(&shared);
            let running = Arc::clone(&running);
            move || dispatch_loop(&shared, &running, &rx)
        });

        Ok(Self {
            shared,
            running,
            worker: Some(worker),
        })
    }
}

impl Watcher for NotifyWatcher {
    fn watch(&self, path: &Path, callback: Trigger) -> WatchGuard {
        let path = normalize(path);
        let dir = parent_dir(&path);

        {
            let mut registry = self.shared.registry.lock().unwrap();
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .subscriptions
                .entry(path.clone())
                .or_default()
                .push((id, callback));

            // Skip a spurious first dispatch for content that is already
            // on disk.
            if !registry.content_hashes.contains_key(&path) {
                if let Ok(bytes) = std::fs::read(&path) {
                    registry
                        .content_hashes
                        .insert(path.clone(), content_hash(&bytes));
                }
            }

            let count = registry.dir_watches.entry(dir.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                let mut backend = self.shared.backend.lock().unwrap();
                if let Err(e) = backend.watch(&dir, RecursiveMode::NonRecursive) {
                    // The subscription stays registered so the guard still
                    // balances; it just never fires.
                    eprintln!("kiln: cannot watch {}: {}", dir.display(), e);
                }
            }

            let sub_id = id;
            let shared = Arc::clone(&self.shared);
            WatchGuard::new(move || release(&shared, &path, &dir, sub_id))
        }
    }
}

fn release(shared: &Shared, path: &Path, dir: &Path, sub_id: u64) {
    let mut registry = shared.registry.lock().unwrap();

    if let Some(subs) = registry.subscriptions.get_mut(path) {
        subs.retain(|(id, _)| *id != sub_id);
        if subs.is_empty() {
            registry.subscriptions.remove(path);
            registry.content_hashes.remove(path);
        }
    }

    if let Some(count) = registry.dir_watches.get_mut(dir) {
        *count -= 1;
        if *count == 0 {
            registry.dir_watches.remove(dir);
            let mut backend = shared.backend.lock().unwrap();
            let _ = backend.unwatch(dir);
        }
    }
}

impl Drop for NotifyWatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn dispatch_loop(shared: &Shared, running: &AtomicBool, rx: &Receiver<PathBuf>) {
    let mut state = DebounceState::new();

    while running.load(Ordering::SeqCst) {
        // Check for file changes (non-blocking with timeout)
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            let path = normalize(&path);
            let subscribed = shared
                .registry
                .lock()
                .unwrap()
                .subscriptions
                .contains_key(&path);
            if subscribed {
                state.add_change(path);
            }
        }

        if state.should_dispatch() {
            for path in state.take_changes() {
                dispatch_one(shared, &path);
            }
        }
    }
}

fn dispatch_one(shared: &Shared, path: &Path) {
    let triggers: Vec<Trigger> = {
        let mut registry = shared.registry.lock().unwrap();

        // Filter out events that did not change content. An unreadable
        // file (deleted, mid-rename) always dispatches.
        match std::fs::read(path) {
            Ok(bytes) => {
                let new_hash = content_hash(&bytes);
                if registry.content_hashes.get(path) == Some(&new_hash) {
                    return;
                }
                registry.content_hashes.insert(path.to_path_buf(), new_hash);
            }
            Err(_) => {
                registry.content_hashes.remove(path);
            }
        }

        registry
            .subscriptions
            .get(path)
            .map(|subs| subs.iter().map(|(_, t)| Arc::clone(t)).collect())
            .unwrap_or_default()
    };

    // Callbacks run without the registry lock; they may subscribe and
    // unsubscribe freely.
    for trigger in triggers {
        trigger();
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("/"),
    }
}

fn content_hash(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Debounce state for the dispatch thread
pub(crate) struct DebounceState {
    pub(crate) pending_changes: HashSet<PathBuf>,
    pub(crate) last_change: Option<Instant>,
}

impl DebounceState {
    pub(crate) fn new() -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    pub(crate) fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    pub(crate) fn should_dispatch(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty() && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
        } else {
            false
        }
    }

    pub(crate) fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}
