//! Incremental rebuild engine
//!
//! The engine keeps one compiled artifact in step with the files it is
//! built from:
//! - [`WatchSet`]: which files the artifact currently depends on
//! - [`DependencyImporter`]: observes the compiler's import traffic and
//!   maintains the watch set as a side effect
//! - [`StylesheetBuild`]: one full compile-reconcile-write run
//! - [`RebuildScheduler`]: serializes runs and coalesces change triggers

mod build;
mod event;
mod importer;
mod scheduler;
mod watch_set;

pub use build::StylesheetBuild;
pub use event::{BuildEvent, CollectingSink, EventSink, NoopSink};
pub use importer::DependencyImporter;
pub use scheduler::{Rebuild, RebuildScheduler};
pub use watch_set::WatchSet;
