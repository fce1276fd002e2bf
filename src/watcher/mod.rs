//! File watching port
//!
//! The engine subscribes to single files and gets a [`WatchGuard`] back; the
//! guard is the only way to stop that subscription. Implementations:
//! - [`NotifyWatcher`]: OS file notifications via `notify`, debounced
//! - [`FakeWatcher`]: in-memory registry for tests, changes fired by hand
//! - [`NullWatcher`]: ignores subscriptions, for one-shot builds

mod fake;
mod notify;

pub use fake::FakeWatcher;
pub use notify::NotifyWatcher;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Callback fired when a watched file changes. Carries no payload; a
/// rebuild re-derives everything from the filesystem.
pub type Trigger = Arc<dyn Fn() + Send + Sync>;

/// Subscribes callbacks to single-file change notifications.
///
/// `watch` cannot fail: backend errors are logged and the subscription is
/// kept in the registry so unsubscription still balances.
pub trait Watcher: Send + Sync {
    fn watch(&self, path: &Path, callback: Trigger) -> WatchGuard;
}

/// Capability to cancel one subscription.
///
/// Cancelling twice is impossible: `unsubscribe` consumes the guard, and
/// dropping an armed guard cancels as a backstop.
pub struct WatchGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard that does nothing when released.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Cancel the subscription now.
    pub fn unsubscribe(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchGuard")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// Watcher for one-shot builds: accepts every subscription and never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWatcher;

impl NullWatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Watcher for NullWatcher {
    fn watch(&self, _path: &Path, _callback: Trigger) -> WatchGuard {
        WatchGuard::noop()
    }
}
