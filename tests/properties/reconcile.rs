//! Property tests for watch-set reconciliation.
//!
//! The invariant under test: after every successful run, the watched paths
//! equal exactly the paths that run consulted.

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use kiln::paths::absolutize;
use kiln::{
    FakeWatcher, Importer, Issuer, KilnResult, MemorySink, NoopSink, Rebuild, StyleCompiler,
    StylesheetBuild, Trigger,
};

const BASE: &str = "/srv/styles";

/// Compiler that consults a scripted set of files per run.
struct ScriptedCompiler {
    runs: Mutex<VecDeque<Vec<String>>>,
}

impl StyleCompiler for ScriptedCompiler {
    fn render(&self, _source: &str, importer: &mut dyn Importer) -> KilnResult<String> {
        let imports = self
            .runs
            .lock()
            .unwrap()
            .pop_front()
            .expect("unplanned compiler run");
        for spec in &imports {
            importer.resolve(spec, Issuer::Root);
        }
        Ok(String::from("compiled"))
    }
}

fn import_sets() -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    proptest::collection::vec(proptest::collection::btree_set(0usize..8, 0..=6), 1..=5)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: For arbitrary sequences of consulted-file sets, every
    /// successful run leaves exactly those files watched.
    #[test]
    fn property_watched_set_tracks_consulted_set(sets in import_sets()) {
        let scripts: Vec<Vec<String>> = sets
            .iter()
            .map(|set| set.iter().map(|i| format!("f{}.scss", i)).collect())
            .collect();

        let watcher = Arc::new(FakeWatcher::new());
        let mut build = StylesheetBuild::new(
            BASE,
            "",
            format!("{}/build/site.css", BASE),
            Box::new(ScriptedCompiler {
                runs: Mutex::new(scripts.clone().into()),
            }),
            watcher.clone(),
            Box::new(MemorySink::new()),
            Arc::new(NoopSink),
        );
        let trigger: Trigger = Arc::new(|| {});

        for imports in &scripts {
            build.rebuild(&trigger).unwrap();

            let expected: BTreeSet<PathBuf> = imports
                .iter()
                .map(|spec| absolutize(std::path::Path::new(BASE), std::path::Path::new(spec)))
                .collect();
            let watched: BTreeSet<PathBuf> = watcher.watched_paths().into_iter().collect();

            prop_assert_eq!(watched, expected);
            prop_assert_eq!(watcher.active(), imports.len());
        }
    }
}
