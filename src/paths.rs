//! Lexical path normalization
//!
//! Watched paths are used as map keys, so every path entering the engine is
//! normalized to one canonical spelling first. Normalization is purely
//! lexical: no filesystem access, no symlink resolution. `..` saturates at
//! the root rather than underflowing.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without touching the filesystem.
///
/// Relative paths stay relative; leading `..` components that cannot be
/// resolved lexically are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // At the root `..` has nowhere to go.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir.as_os_str()),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Resolve `path` against `base` and normalize the result.
///
/// Absolute paths ignore `base`. The result is absolute whenever `base` is.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}
