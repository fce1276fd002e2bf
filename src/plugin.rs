//! Plugin lifecycle
//!
//! The surface a host build tool consumes. Activation wires the pieces
//! together: it composes the synthetic root compilation unit from the
//! configured sources, runs one eager build so the dependency set is fully
//! discovered and watched before activation returns, and hands back a
//! [`PluginHandle`] whose shutdown releases every watch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::GrassCompiler;
use crate::engine::{EventSink, RebuildScheduler, StylesheetBuild};
use crate::error::KilnResult;
use crate::output::FsSink;
use crate::settings::BuildSettings;
use crate::watcher::Watcher;

/// A build-tool plugin claiming a set of source-file suffixes.
pub trait BuildPlugin: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// File suffixes this plugin claims from the configured source list.
    fn claimed_suffixes(&self) -> &'static [&'static str];

    /// Keep only the sources whose suffix this plugin claims.
    fn filter_srcs(&self, srcs: &[PathBuf]) -> Vec<PathBuf> {
        srcs.iter()
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        self.claimed_suffixes()
                            .iter()
                            .any(|claimed| claimed.eq_ignore_ascii_case(ext))
                    })
            })
            .cloned()
            .collect()
    }

    /// Build once eagerly, then keep the artifact current through `watcher`.
    ///
    /// The first build's failure propagates to the caller. Later rebuilds
    /// are fire-and-forget; their failures reach `events` only.
    fn activate(
        &self,
        watcher: Arc<dyn Watcher>,
        settings: &BuildSettings,
        events: Arc<dyn EventSink>,
    ) -> KilnResult<PluginHandle>;
}

/// Compiles `.scss`/`.sass` sources into one CSS artifact.
#[derive(Debug, Default)]
pub struct SassPlugin;

impl SassPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl BuildPlugin for SassPlugin {
    fn name(&self) -> &'static str {
        "sass"
    }

    fn claimed_suffixes(&self) -> &'static [&'static str] {
        &["scss", "sass"]
    }

    fn activate(
        &self,
        watcher: Arc<dyn Watcher>,
        settings: &BuildSettings,
        events: Arc<dyn EventSink>,
    ) -> KilnResult<PluginHandle> {
        let srcs = self.filter_srcs(&settings.srcs);
        if srcs.is_empty() {
            return Ok(PluginHandle::noop());
        }

        let source = compose_root(&settings.base_dir, &srcs);
        let compiler = GrassCompiler::new(&settings.base_dir, settings.release);
        let build = StylesheetBuild::new(
            settings.base_dir.clone(),
            source,
            settings.output_path(),
            Box::new(compiler),
            watcher,
            Box::new(FsSink::new()),
            events,
        );
        let scheduler = Arc::new(RebuildScheduler::new(build));

        // Watches registered before a failure point stay live: the watcher
        // callbacks pin the scheduler, and only a successful run reconciles.
        scheduler.run_blocking()?;

        Ok(PluginHandle::active(scheduler))
    }
}

/// The synthetic root compilation unit: one import directive per source,
/// in configured order, spelled relative to the base directory.
fn compose_root(base_dir: &Path, srcs: &[PathBuf]) -> String {
    let mut root = String::new();
    for src in srcs {
        let specifier = match src.strip_prefix(base_dir) {
            Ok(rel) => format!("./{}", slashed(rel)),
            // A source outside the base directory is imported by its
            // absolute path.
            Err(_) => slashed(src),
        };
        root.push_str(&format!("@import \"{}\";\n", specifier));
    }
    root
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Handle returned by a successful activation.
///
/// `shutdown` (or dropping the handle) stops the scheduler and releases
/// every watch, exactly once.
pub struct PluginHandle {
    scheduler: Option<Arc<RebuildScheduler<StylesheetBuild>>>,
}

impl PluginHandle {
    fn active(scheduler: Arc<RebuildScheduler<StylesheetBuild>>) -> Self {
        Self {
            scheduler: Some(scheduler),
        }
    }

    /// Handle for an activation that had nothing to build.
    pub fn noop() -> Self {
        Self { scheduler: None }
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Stop accepting triggers and release every watch.
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
            // Waits out any in-flight run before draining the watch set.
            scheduler.with_routine(|build| build.teardown());
        }
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("active", &self.is_active())
            .finish()
    }
}
