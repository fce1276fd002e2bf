//! Kiln - incremental stylesheet bundler
//!
//! Kiln compiles a set of Sass/SCSS sources into one CSS artifact and keeps
//! that artifact current as files change. Dependencies are discovered lazily
//! while the compiler runs, so exactly the files a build consulted are
//! watched, no more and no fewer.

pub mod compiler;
pub mod engine;
pub mod error;
pub mod output;
pub mod paths;
pub mod plugin;
pub mod settings;
pub mod watcher;

// Re-exports for convenience
pub use compiler::{GrassCompiler, Importer, Issuer, StyleCompiler};
pub use engine::{
    BuildEvent, CollectingSink, DependencyImporter, EventSink, NoopSink, Rebuild,
    RebuildScheduler, StylesheetBuild, WatchSet,
};
pub use error::{KilnError, KilnResult};
pub use output::{FsSink, MemorySink, OutputSink};
pub use plugin::{BuildPlugin, PluginHandle, SassPlugin};
pub use settings::{BuildSettings, SettingsWarning};
pub use watcher::{FakeWatcher, NotifyWatcher, NullWatcher, Trigger, WatchGuard, Watcher};
