//! Shared helpers for kiln integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use kiln::BuildSettings;

/// Write a file under `base`, creating parent directories as needed.
pub fn write_file(base: &Path, relative: &str, content: &str) -> PathBuf {
    let path = base.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directories");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// Settings rooted at `base` with the given sources, artifact `site.css`.
pub fn settings_for(base: &Path, srcs: &[&str]) -> BuildSettings {
    BuildSettings::new("site", base).with_srcs(srcs.iter().map(PathBuf::from).collect())
}

/// Poll until `condition` holds or `timeout` passes.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    condition()
}
