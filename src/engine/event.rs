//! Build event types and sink port
//!
//! Every run reports its lifecycle through an [`EventSink`]: start, watch
//! set changes, then finished or failed. Sinks render to terminal, NDJSON,
//! or memory; the engine never prints anything itself.

use std::sync::Mutex;

/// Event emitted during build runs
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BuildEvent {
    /// A run started (first build or rebuild)
    BuildStarted,

    /// A file joined the watch set
    DependencyAdded { path: String },

    /// A file left the watch set after a run stopped consulting it
    DependencyDropped { path: String },

    /// Run succeeded and the artifact was written
    BuildFinished {
        output: String,
        dependencies: usize,
        duration_ms: u64,
    },

    /// Run failed; the previous artifact is untouched
    BuildFailed { message: String },

    /// All watches were released at teardown
    WatchStopped,
}

impl BuildEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Trait for receiving build events
///
/// Implementations can be:
/// - console sink: human-readable progress lines
/// - JSON sink: NDJSON event stream for CI
/// - [`NoopSink`]: silent operation
pub trait EventSink: Send + Sync {
    /// Handle a build event
    fn on_event(&self, event: BuildEvent);

    /// Check if this sink wants per-dependency events.
    ///
    /// Summary-only sinks can skip `DependencyAdded`/`DependencyDropped`
    /// traffic entirely.
    fn wants_dependency_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_event(&self, _event: BuildEvent) {
        // Do nothing
    }

    fn wants_dependency_events(&self) -> bool {
        false
    }
}

/// Event sink that records everything, for assertions in tests.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Count of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&BuildEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn on_event(&self, event: BuildEvent) {
        self.events.lock().unwrap().push(event);
    }
}
